// Example: Basic usage of the notecase-core library
use std::fs;

use notecase_core::models::*;
use notecase_core::storage::*;
use notecase_core::{IntegrityGuard, Session, Suggestions, Workspace};

fn main() -> anyhow::Result<()> {
    let db_path = "basic_usage_notecase.db";
    fs::remove_file(db_path).ok(); // Clean up previous run

    println!("--- Basic Usage of notecase-core ---");

    // ========== Open the store ==========
    println!("\n1. Opening database...");
    let gateway = SqliteGateway::open(db_path)?;
    println!(
        "   ✓ Schema version {}",
        Database::schema_version(gateway.connection())?
    );

    // ========== Sign in ==========
    println!("\n2. Signing up...");
    let mut session = Session::anonymous();
    let user = session.sign_up(&gateway, "Ada", "ada@example.com")?;
    println!("   ✓ Signed in as {}", user.label());

    // ========== Categories ==========
    println!("\n3. Loading categories...");
    let mut workspace = Workspace::load(gateway)?;
    for (depth, category) in workspace.categories().flatten_with_depth() {
        println!("   {}{} ({})", "  ".repeat(depth), category.name, category.id);
    }

    let testing = workspace.create_category(&session, "Testing", None, Some("cat-1"))?;
    println!("   ✓ Created sub-category {} under Software Engineering", testing.name);

    // ========== Notes ==========
    println!("\n4. Creating notes...");
    let hooks = workspace.create_note(
        &session,
        "React hooks",
        "useState and useEffect cover most components.",
        "sub-cat-1",
        &["React".to_string()],
    )?;
    println!("   ✓ Created note: {} [{}]", hooks.title, hooks.tags.join(", "));

    let plan = workspace.create_note(
        &session,
        "Test plan",
        "Unit tests first, then integration.",
        &testing.id,
        &[],
    )?;
    println!("   ✓ Created note: {}", plan.title);

    // ========== Attachments ==========
    println!("\n5. Attaching a file...");
    let attachment = Attachment::new(
        "coverage.pdf".to_string(),
        None,
        "/tmp/coverage.pdf".to_string(),
        48_200,
    );
    println!(
        "   ✓ {} ({}, {})",
        attachment.name,
        attachment.kind.as_str(),
        attachment.size
    );
    workspace.attach(&session, &plan.id, attachment)?;

    // ========== Suggestions ==========
    println!("\n6. Applying suggestions...");
    let suggestions: Suggestions = serde_json::from_str(
        r#"{"suggestedTags":["hooks","frontend"],"suggestedHeaders":["Frontend"]}"#,
    )?;
    let updated = workspace.apply_suggestions(&session, &hooks.id, &suggestions, true)?;
    println!("   ✓ Tags now: {}", updated.tags.join(", "));

    // ========== Search ==========
    println!("\n7. Searching...");
    for note in workspace.visible_notes(Some("cat-1"), "test") {
        println!("   - {}", note.title);
    }

    // ========== Integrity ==========
    println!("\n8. Deleting categories...");
    let deletable = IntegrityGuard::can_delete("cat-1", workspace.notes(), workspace.categories());
    println!("   Software Engineering deletable: {}", deletable);
    if let Err(e) = workspace.delete_category(&session, "cat-1") {
        println!("   ✗ {}", e);
    }
    workspace.delete_category(&session, "cat-3")?;
    println!("   ✓ Deleted Personal Development");

    println!("\n--- Done ---");
    Ok(())
}

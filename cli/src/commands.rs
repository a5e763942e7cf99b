use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

use notecase_core::models::{Attachment, Note};
use notecase_core::storage::{PersistenceGateway, SqliteGateway};
use notecase_core::{Session, SessionStore, Suggestions, Workspace};

use crate::config::Config;
use crate::{CategoryCommand, Commands, NoteCommand};

/// Open the configured database and session, then run `command`
pub fn dispatch(config: &Config, command: Commands) -> Result<()> {
    debug!(
        database = %config.database_path.display(),
        session = %config.session_path.display(),
        "opening workspace"
    );
    let gateway = SqliteGateway::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    let mut session = Session::restore(SessionStore::new(&config.session_path))?;
    let mut workspace = Workspace::load(gateway)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&mut workspace, &mut session, command, &mut out)
}

pub fn execute<G: PersistenceGateway, W: Write>(
    ws: &mut Workspace<G>,
    session: &mut Session,
    command: Commands,
    out: &mut W,
) -> Result<()> {
    match command {
        Commands::Login { email } => {
            let user = session.login(ws.gateway(), &email)?;
            writeln!(out, "Signed in as {}", user.label())?;
        }
        Commands::Signup { email, name } => {
            let user = session.sign_up(ws.gateway(), &name, &email)?;
            writeln!(out, "Welcome, {}", user.label())?;
        }
        Commands::Logout => {
            session.logout()?;
            writeln!(out, "Signed out")?;
        }
        Commands::Whoami => whoami(session, out)?,
        Commands::Profile {
            name,
            primary,
            background,
            accent,
            note_color,
            category_color,
            subcategory_color,
        } => {
            let theme_changed = [&primary, &background, &accent, &note_color, &category_color, &subcategory_color]
                .iter()
                .any(|v| v.is_some());
            let theme = if theme_changed {
                let mut theme = session.require_user()?.effective_theme();
                if let Some(v) = primary {
                    theme.primary = v;
                }
                if let Some(v) = background {
                    theme.background = v;
                }
                if let Some(v) = accent {
                    theme.accent = v;
                }
                if note_color.is_some() {
                    theme.note = note_color;
                }
                if category_color.is_some() {
                    theme.category = category_color;
                }
                if subcategory_color.is_some() {
                    theme.subcategory = subcategory_color;
                }
                Some(theme)
            } else {
                None
            };
            session.update_profile(ws.gateway(), name, theme)?;
            writeln!(out, "Profile updated")?;
        }
        Commands::Category(cmd) => category(ws, session, cmd, out)?,
        Commands::Note(cmd) => note(ws, session, cmd, out)?,
        Commands::Tags => {
            for (tag, count) in ws.notes().tag_counts() {
                writeln!(out, "{} ({})", tag, count)?;
            }
        }
    }
    Ok(())
}

fn whoami<W: Write>(session: &Session, out: &mut W) -> Result<()> {
    match session.user() {
        Some(user) => {
            writeln!(out, "{} <{}>", user.label(), user.email)?;
            for (name, value) in session.theme().variables() {
                writeln!(out, "  {}: {}", name, value)?;
            }
        }
        None => writeln!(out, "Not signed in")?,
    }
    Ok(())
}

fn category<G: PersistenceGateway, W: Write>(
    ws: &mut Workspace<G>,
    session: &Session,
    cmd: CategoryCommand,
    out: &mut W,
) -> Result<()> {
    match cmd {
        CategoryCommand::List => {
            for (depth, category) in ws.categories().flatten_with_depth() {
                writeln!(
                    out,
                    "{}{} [{}] {}",
                    "  ".repeat(depth),
                    category.name,
                    category.id,
                    category.color
                )?;
            }
        }
        CategoryCommand::Add { name, color, parent } => {
            let created = ws.create_category(session, &name, color.as_deref(), parent.as_deref())?;
            writeln!(out, "Created category {} ({})", created.name, created.id)?;
        }
        CategoryCommand::Edit { id, name, color } => {
            let updated = ws.update_category(session, &id, name.as_deref(), color.as_deref())?;
            writeln!(out, "Updated category {} ({})", updated.name, updated.id)?;
        }
        CategoryCommand::Rm { id } => {
            ws.delete_category(session, &id)?;
            writeln!(out, "Deleted category {}", id)?;
        }
    }
    Ok(())
}

fn note<G: PersistenceGateway, W: Write>(
    ws: &mut Workspace<G>,
    session: &Session,
    cmd: NoteCommand,
    out: &mut W,
) -> Result<()> {
    match cmd {
        NoteCommand::List { category, search } => {
            let notes = ws.visible_notes(category.as_deref(), search.as_deref().unwrap_or(""));
            if notes.is_empty() {
                writeln!(out, "No notes")?;
            }
            for note in notes {
                write_summary(ws, note, out)?;
            }
        }
        NoteCommand::Show { id } => {
            let note = find_note(ws, &id)?;
            write_details(ws, note, out)?;
        }
        NoteCommand::Add {
            title,
            content,
            category,
            tags,
        } => {
            let note = ws.create_note(session, &title, &content, &category, &tags)?;
            writeln!(out, "Created note {}", note.id)?;
        }
        NoteCommand::Edit {
            id,
            title,
            content,
            category,
            tags,
            untags,
        } => {
            let mut note = find_note(ws, &id)?.clone();
            if let Some(title) = title {
                note.title = title.trim().to_string();
            }
            if let Some(content) = content {
                note.content = content;
            }
            if let Some(category) = category {
                note.category_id = category;
            }
            for tag in &tags {
                note.add_tag(tag);
            }
            for tag in &untags {
                note.remove_tag(tag);
            }
            ws.save_note(session, note)?;
            writeln!(out, "Updated note {}", id)?;
        }
        NoteCommand::Rm { id } => {
            ws.delete_note(session, &id)?;
            writeln!(out, "Deleted note {}", id)?;
        }
        NoteCommand::Attach { id, path, mime } => {
            let attachment = attachment_for(&path, mime.as_deref())?;
            let summary = format!(
                "Attached {} ({}, {}) as {}",
                attachment.name,
                attachment.kind.as_str(),
                attachment.size,
                attachment.id
            );
            ws.attach(session, &id, attachment)?;
            writeln!(out, "{}", summary)?;
        }
        NoteCommand::Detach { id, attachment_id } => {
            let removed = ws.detach(session, &id, &attachment_id)?;
            writeln!(out, "Removed {} from note {}", removed.name, id)?;
        }
        NoteCommand::Suggest { id, from, tags_only } => {
            let content = fs::read_to_string(&from)
                .with_context(|| format!("Failed to read suggestions from {}", from.display()))?;
            let suggestions: Suggestions =
                serde_json::from_str(&content).context("Suggestions must be a JSON object")?;
            let note = ws.apply_suggestions(session, &id, &suggestions, !tags_only)?;
            writeln!(out, "Tags: {}", note.tags.join(", "))?;
            writeln!(out, "Category: {}", category_label(ws, &note))?;
        }
    }
    Ok(())
}

fn find_note<'a, G: PersistenceGateway>(ws: &'a Workspace<G>, id: &str) -> Result<&'a Note> {
    match ws.notes().get(id) {
        Some(note) => Ok(note),
        None => bail!("Note not found: {}", id),
    }
}

fn category_label<G: PersistenceGateway>(ws: &Workspace<G>, note: &Note) -> String {
    match ws.category_of(note) {
        Some(category) => category.name.clone(),
        None => "(no category)".to_string(),
    }
}

fn write_summary<G: PersistenceGateway, W: Write>(ws: &Workspace<G>, note: &Note, out: &mut W) -> Result<()> {
    let mut line = format!(
        "{}  {}  {}  [{}]",
        note.id,
        note.created_at.format("%Y-%m-%d"),
        note.title,
        category_label(ws, note)
    );
    for tag in &note.tags {
        line.push_str(" #");
        line.push_str(tag);
    }
    writeln!(out, "{}", line)?;
    Ok(())
}

fn write_details<G: PersistenceGateway, W: Write>(ws: &Workspace<G>, note: &Note, out: &mut W) -> Result<()> {
    writeln!(out, "{}", note.title)?;
    writeln!(out, "id: {}", note.id)?;
    writeln!(out, "category: {}", category_label(ws, note))?;
    writeln!(out, "created: {}", note.created_at.format("%Y-%m-%d %H:%M"))?;
    if !note.tags.is_empty() {
        writeln!(out, "tags: {}", note.tags.join(", "))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", note.content)?;
    if !note.attachments.is_empty() {
        writeln!(out)?;
        writeln!(out, "attachments:")?;
        for attachment in &note.attachments {
            writeln!(
                out,
                "  {} {} ({}, {})",
                attachment.id,
                attachment.name,
                attachment.kind.as_str(),
                attachment.size
            )?;
        }
    }
    Ok(())
}

/// Describe a local file as an attachment; the file itself stays where it is
fn attachment_for(path: &Path, mime: Option<&str>) -> Result<Attachment> {
    let metadata = fs::metadata(path).with_context(|| format!("Cannot read {}", path.display()))?;
    if !metadata.is_file() {
        bail!("Not a file: {}", path.display());
    }
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => bail!("Not a file: {}", path.display()),
    };
    Ok(Attachment::new(
        name,
        mime,
        path.display().to_string(),
        metadata.len(),
    ))
}

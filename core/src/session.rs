//! Signed-in session.
//!
//! A `Session` is created explicitly (restored from its `SessionStore` at
//! start-up) and handed to every operation that needs to know who is signed
//! in. Logging out clears the stored session and the theme falls back to the
//! default palette.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::models::{User, UserTheme};
use crate::storage::PersistenceGateway;
use crate::{Error, Result};

/// File-backed storage for the signed-in user
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored user. A missing file means nobody is signed in; an
    /// unreadable one is treated the same way.
    pub fn load(&self) -> Result<Option<User>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    pub fn save(&self, user: &User) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(user)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    user: Option<User>,
    store: Option<SessionStore>,
}

impl Session {
    /// A signed-out session that is never persisted
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Restore whatever session `store` holds
    pub fn restore(store: SessionStore) -> Result<Self> {
        let user = store.load()?;
        if let Some(user) = &user {
            info!(email = %user.email, "restored session");
        }
        Ok(Self {
            user,
            store: Some(store),
        })
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    /// The signed-in user, or `Error::NotSignedIn`
    pub fn require_user(&self) -> Result<&User> {
        self.user.as_ref().ok_or(Error::NotSignedIn)
    }

    /// Theme to apply: the user's own, or the default palette
    pub fn theme(&self) -> UserTheme {
        self.user
            .as_ref()
            .map(User::effective_theme)
            .unwrap_or_default()
    }

    /// Sign in with just an email. A saved profile is used when one exists,
    /// otherwise a blank profile for that email.
    pub fn login<G: PersistenceGateway>(&mut self, gateway: &G, email: &str) -> Result<&User> {
        let email = validate_email(email)?;
        let user = match gateway.load_user(email)? {
            Some(user) => user,
            None => User::new(String::new(), email.to_string()),
        };
        self.set_user(user)
    }

    /// Create (or refresh) a profile and sign in with it
    pub fn sign_up<G: PersistenceGateway>(
        &mut self,
        gateway: &G,
        display_name: &str,
        email: &str,
    ) -> Result<&User> {
        let email = validate_email(email)?;
        let mut user = gateway
            .load_user(email)?
            .unwrap_or_else(|| User::new(String::new(), email.to_string()));
        user.display_name = display_name.trim().to_string();
        gateway.save_user(&user)?;
        self.set_user(user)
    }

    /// Change the signed-in user's display name and/or theme. The profile is
    /// saved through the gateway before the session picks it up.
    pub fn update_profile<G: PersistenceGateway>(
        &mut self,
        gateway: &G,
        display_name: Option<String>,
        theme: Option<UserTheme>,
    ) -> Result<&User> {
        let mut user = self.require_user()?.clone();
        if let Some(name) = display_name {
            user.display_name = name.trim().to_string();
        }
        if let Some(theme) = theme {
            user.theme = Some(theme);
        }
        gateway.save_user(&user)?;
        self.set_user(user)
    }

    /// Sign out and forget the stored session
    pub fn logout(&mut self) -> Result<()> {
        if let Some(store) = &self.store {
            store.clear()?;
        }
        if let Some(user) = self.user.take() {
            info!(email = %user.email, "signed out");
        }
        Ok(())
    }

    fn set_user(&mut self, user: User) -> Result<&User> {
        if let Some(store) = &self.store {
            store.save(&user)?;
        }
        info!(email = %user.email, "signed in");
        Ok(self.user.insert(user))
    }
}

fn validate_email(email: &str) -> Result<&str> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::InvalidInput("Please enter your email.".to_string()));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryGateway;
    use tempfile::tempdir;

    #[test]
    fn test_login_unknown_email_gets_blank_profile() {
        let gateway = MemoryGateway::new();
        let mut session = Session::anonymous();

        let user = session.login(&gateway, " ada@example.com ").unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.display_name, "");
        assert!(session.is_signed_in());
        assert_eq!(gateway.write_count(), 0);
    }

    #[test]
    fn test_login_requires_email() {
        let gateway = MemoryGateway::new();
        let mut session = Session::anonymous();
        assert!(matches!(session.login(&gateway, "  "), Err(Error::InvalidInput(_))));
        assert!(!session.is_signed_in());
    }

    #[test]
    fn test_login_uses_saved_profile() {
        let gateway = MemoryGateway::new();
        let mut saved = User::new("Ada".into(), "ada@example.com".into());
        saved.theme = Some(UserTheme {
            accent: "0 100% 50%".into(),
            ..UserTheme::default()
        });
        gateway.save_user(&saved).unwrap();

        let mut session = Session::anonymous();
        session.login(&gateway, "ada@example.com").unwrap();
        assert_eq!(session.user(), Some(&saved));
        assert_eq!(session.theme().accent, "0 100% 50%");
    }

    #[test]
    fn test_session_lifecycle_is_persisted() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let gateway = MemoryGateway::new();

        let mut session = Session::restore(store.clone()).unwrap();
        assert!(!session.is_signed_in());

        session.sign_up(&gateway, "Ada", "ada@example.com").unwrap();
        assert!(store.path().exists());

        let restored = Session::restore(store.clone()).unwrap();
        assert_eq!(restored.user().map(|u| u.label()), Some("Ada"));

        session.logout().unwrap();
        assert!(!session.is_signed_in());
        assert!(!store.path().exists());
        assert_eq!(session.theme(), UserTheme::default());
        assert!(!Session::restore(store).unwrap().is_signed_in());
    }

    #[test]
    fn test_update_profile_requires_sign_in() {
        let gateway = MemoryGateway::new();
        let mut session = Session::anonymous();
        assert!(matches!(
            session.update_profile(&gateway, Some("Ada".into()), None),
            Err(Error::NotSignedIn)
        ));
    }

    #[test]
    fn test_update_profile_saves_before_applying() {
        let gateway = MemoryGateway::new();
        let mut session = Session::anonymous();
        session.login(&gateway, "ada@example.com").unwrap();

        gateway.fail_next_writes(1);
        assert!(session.update_profile(&gateway, Some("Ada".into()), None).is_err());
        assert_eq!(session.user().map(|u| u.display_name.as_str()), Some(""));

        let theme = UserTheme {
            note: Some("#ffffff".into()),
            ..UserTheme::default()
        };
        session
            .update_profile(&gateway, Some("Ada".into()), Some(theme.clone()))
            .unwrap();
        assert_eq!(session.theme(), theme);
        assert_eq!(
            gateway.load_user("ada@example.com").unwrap().map(|u| u.display_name),
            Some("Ada".to_string())
        );
    }

    #[test]
    fn test_corrupt_session_file_means_signed_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let session = Session::restore(SessionStore::new(&path)).unwrap();
        assert!(!session.is_signed_in());
    }
}

//! Password verification for the console login.

use std::path::Path;

use thiserror::Error;

/// Why a login was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication failed")]
    Denied,
    #[error("authentication service unavailable: {0}")]
    Unavailable(String),
}

/// Validate `user`/`password` against the `login` PAM service.
#[cfg(feature = "pam")]
pub fn authenticate(user: &str, password: &str, _shadow: &Path) -> Result<(), AuthError> {
    let mut client = pam::Client::with_password("login")
        .map_err(|e| AuthError::Unavailable(e.to_string()))?;
    client.conversation_mut().set_credentials(user, password);
    client.authenticate().map_err(|e| {
        tracing::info!("pam refused {user}: {e}");
        AuthError::Denied
    })
}

/// Validate `user`/`password` against the crypt hash in the shadow file.
#[cfg(not(feature = "pam"))]
pub fn authenticate(user: &str, password: &str, shadow: &Path) -> Result<(), AuthError> {
    let text = std::fs::read_to_string(shadow)
        .map_err(|e| AuthError::Unavailable(format!("{}: {e}", shadow.display())))?;
    verify_shadow(&text, user, password)
}

/// Check a password against the user's entry in shadow-format text.
pub fn verify_shadow(text: &str, user: &str, password: &str) -> Result<(), AuthError> {
    let hash = text
        .lines()
        .filter_map(|l| {
            let mut f = l.split(':');
            Some((f.next()?, f.next()?))
        })
        .find(|(name, _)| *name == user)
        .map(|(_, hash)| hash)
        .ok_or(AuthError::Denied)?;
    if hash.is_empty() || hash.starts_with('!') || hash.starts_with('*') {
        return Err(AuthError::Denied);
    }
    if pwhash::unix::verify(password, hash) {
        Ok(())
    } else {
        Err(AuthError::Denied)
    }
}

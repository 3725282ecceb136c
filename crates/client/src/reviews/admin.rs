//! Shared-password gate for moderation operations.

use kiteshell_core::Error;

/// Checks a supplied password against the configured admin password.
///
/// With no password configured every admin operation is refused.
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    password: Option<String>,
}

impl AdminGate {
    pub fn new(password: Option<String>) -> Self {
        Self { password: password.filter(|p| !p.is_empty()) }
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    pub fn check(&self, supplied: Option<&str>) -> Result<(), Error> {
        let Some(expected) = &self.password else {
            return Err(Error::Unauthorized("admin operations are disabled".into()));
        };

        match supplied {
            Some(supplied) if supplied == expected => Ok(()),
            Some(_) => Err(Error::Unauthorized("wrong admin password".into())),
            None => Err(Error::Unauthorized("admin password required".into())),
        }
    }
}

//! Application state module

use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};

use crate::domain::communication::emails::EmailService;

/// Global application state
#[derive(Clone)]
pub struct AppState<E: EmailService> {
    /// The time the server started
    pub start_time: DateTime<Utc>,

    /// Email service
    pub emails: Arc<E>,
}

impl<E> AppState<E>
where
    E: EmailService,
{
    /// Create a new application state
    pub fn new(emails: E) -> Self {
        Self {
            start_time: Utc::now(),
            emails: Arc::new(emails),
        }
    }
}

impl<E> fmt::Debug for AppState<E>
where
    E: EmailService,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("start_time", &self.start_time)
            .field("emails", &"EmailService")
            .finish()
    }
}

#[cfg(test)]
pub mod tests {
    use crate::domain::communication::emails::tests::MockEmailService;

    use super::*;

    pub fn test_state(emails: Option<MockEmailService>) -> AppState<MockEmailService> {
        AppState::new(emails.unwrap_or_default())
    }
}

//! Transient notifications shown after a mutation.

use serde::Serialize;

use crate::ActionError;

/// Shown when a failure carries no message of its own.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: Option<String>,
}

impl Notification {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            description: None,
        }
    }

    /// Error notification carrying the failure's own message when it has one.
    pub fn failure(title: impl Into<String>, err: &ActionError) -> Self {
        let title = title.into();
        tracing::warn!(%title, error = %err, "action failed");
        Self {
            level: NotificationLevel::Error,
            title,
            description: Some(err.user_message().unwrap_or_else(|| GENERIC_FAILURE.to_string())),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.level == NotificationLevel::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcelhub_client::ApiError;

    #[test]
    fn failure_uses_server_message() {
        let err = ActionError::from(ApiError::Http {
            status: 400,
            message: Some("Parcel is blocked".into()),
        });
        let n = Notification::failure("Failed to cancel delivery", &err);
        assert_eq!(n.level, NotificationLevel::Error);
        assert_eq!(n.description.as_deref(), Some("Parcel is blocked"));
    }

    #[test]
    fn failure_falls_back_to_generic_text() {
        let err = ActionError::from(ApiError::Network("connection reset".into()));
        let n = Notification::failure("Failed to send parcel", &err);
        assert_eq!(n.description.as_deref(), Some(GENERIC_FAILURE));
        assert!(!n.is_success());
    }
}

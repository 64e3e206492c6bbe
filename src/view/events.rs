use crate::api::models::{Contact, Message};
use crate::error::NetworkError;

/// Completion of a background request, delivered to the controller's task.
#[derive(Debug)]
pub enum ViewEvent {
    ContactsLoaded {
        seq: u64,
        result: Result<Vec<Contact>, NetworkError>,
    },
    MessagesLoaded {
        seq: u64,
        contact_id: String,
        result: Result<Vec<Message>, NetworkError>,
    },
    MessageSent {
        contact_id: String,
        result: Result<(), NetworkError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// A transient message for the user, shown once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

impl Notification {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            text: text.into(),
        }
    }
}

use std::fmt;
use thiserror::Error;

/// The backing-store call that produced a [`NetworkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchContacts,
    FetchMessages,
    SendMessage,
}

impl Operation {
    /// Generic text shown to the user when nothing better is available.
    pub fn failure_text(self) -> &'static str {
        match self {
            Operation::FetchContacts => "Failed to fetch contacts from Airtable.",
            Operation::FetchMessages => "Failed to fetch messages from Airtable.",
            Operation::SendMessage => "Failed to send message.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::FetchContacts => "fetch contacts",
            Operation::FetchMessages => "fetch messages",
            Operation::SendMessage => "send message",
        };
        f.write_str(name)
    }
}

/// Every failure the Airtable client can surface. Auth, rate-limit and
/// server errors are not told apart.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("{op} failed: {source}")]
    Transport {
        op: Operation,
        #[source]
        source: reqwest::Error,
    },
    #[error("{op} failed with HTTP {status}")]
    Status {
        op: Operation,
        status: u16,
        message: Option<String>,
    },
    #[error("{op} returned an unreadable body: {source}")]
    Decode {
        op: Operation,
        #[source]
        source: reqwest::Error,
    },
}

impl NetworkError {
    pub fn operation(&self) -> Operation {
        match self {
            NetworkError::Transport { op, .. }
            | NetworkError::Status { op, .. }
            | NetworkError::Decode { op, .. } => *op,
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message taken from the Airtable error body, if the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            NetworkError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        self.server_message()
            .unwrap_or_else(|| self.operation().failure_text())
            .to_string()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration value `{0}`")]
    Missing(&'static str),
    #[error("no config directory available")]
    NoConfigDir,
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid api url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("terminal io: {0}")]
    Io(#[from] std::io::Error),
}

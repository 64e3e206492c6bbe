use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ContactStatus {
    Active,
    #[default]
    Inactive,
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactStatus::Active => f.write_str("Active"),
            ContactStatus::Inactive => f.write_str("Inactive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Direction {
    #[default]
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn matches(self, status: ContactStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == ContactStatus::Active,
            StatusFilter::Inactive => status == ContactStatus::Inactive,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "inactive" => Ok(StatusFilter::Inactive),
            other => Err(format!("unknown status filter: {other}")),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("All"),
            StatusFilter::Active => f.write_str("Active"),
            StatusFilter::Inactive => f.write_str("Inactive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub last_message: String,
    pub last_message_timestamp: String,
    pub status: ContactStatus,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub contact_id: String,
    pub text: String,
    pub direction: Direction,
    pub timestamp: String,
}

/// Single-select cells can hold options this client does not know. Those
/// read as an empty cell instead of failing the whole page.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

// Raw Airtable shapes. Airtable drops empty cells from `fields`, so every
// column is optional here.

#[derive(Debug, Clone, Deserialize)]
pub struct AirtableRecord<T> {
    pub id: String,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
    pub fields: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordPage<T> {
    pub records: Vec<AirtableRecord<T>>,
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFields {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Phone", default)]
    pub phone: Option<String>,
    #[serde(rename = "Last Message", default)]
    pub last_message: Option<String>,
    #[serde(rename = "Last Contact Time", default)]
    pub last_contact_time: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "lenient")]
    pub status: Option<ContactStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageFields {
    #[serde(rename = "Message Text", default)]
    pub text: Option<String>,
    #[serde(rename = "Direction", default, deserialize_with = "lenient")]
    pub direction: Option<Direction>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: Option<String>,
    /// Linked record into the contacts table; the first id is authoritative.
    #[serde(rename = "Contact", default)]
    pub contact: Vec<String>,
}

/// Body of a record-create POST: `{ "fields": { ... } }`.
#[derive(Debug, Serialize)]
pub struct CreateRecord<T> {
    pub fields: T,
}

#[derive(Debug, Serialize)]
pub struct OutgoingMessageFields<'a> {
    #[serde(rename = "Message Text")]
    pub text: &'a str,
    #[serde(rename = "Direction")]
    pub direction: Direction,
    #[serde(rename = "Contact")]
    pub contact: [&'a str; 1],
    /// Picked up by the base's automation, which does the actual delivery.
    #[serde(rename = "Send")]
    pub send: bool,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Detailed {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        #[serde(default)]
        message: Option<String>,
    },
    Code(String),
}

impl ErrorDetail {
    pub fn into_message(self) -> Option<String> {
        match self {
            ErrorDetail::Detailed { kind, message } => message.or(kind),
            ErrorDetail::Code(code) => Some(code),
        }
    }
}

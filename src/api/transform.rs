use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};

use crate::api::models::{AirtableRecord, Contact, ContactFields, Message, MessageFields};

pub const NO_MESSAGES_YET: &str = "No messages yet";
const UNKNOWN_AVATAR: &str = "??";

/// Maps a contacts-table record into the shape the views use.
pub fn transform_contact(record: &AirtableRecord<ContactFields>) -> Contact {
    let fields = &record.fields;
    let name = fields.name.clone().unwrap_or_default();
    let last_message = fields
        .last_message
        .as_deref()
        .filter(|text| !text.is_empty())
        .unwrap_or(NO_MESSAGES_YET)
        .to_string();

    Contact {
        id: record.id.clone(),
        avatar: initials(&name),
        name,
        phone: fields.phone.clone().unwrap_or_default(),
        last_message,
        last_message_timestamp: fields.last_contact_time.clone().unwrap_or_default(),
        status: fields.status.unwrap_or_default(),
    }
}

/// Maps a messages-table record. The owning contact is the first entry of
/// the linked-record array.
pub fn transform_message(record: &AirtableRecord<MessageFields>) -> Message {
    let fields = &record.fields;
    Message {
        id: record.id.clone(),
        contact_id: fields.contact.first().cloned().unwrap_or_default(),
        text: fields.text.clone().unwrap_or_default(),
        direction: fields.direction.unwrap_or_default(),
        timestamp: fields
            .timestamp
            .clone()
            .or_else(|| record.created_time.clone())
            .unwrap_or_default(),
    }
}

/// First character of every whitespace-separated token, source casing kept.
pub fn initials(name: &str) -> String {
    if name.trim().is_empty() {
        return UNKNOWN_AVATAR.to_string();
    }
    name.split_whitespace()
        .filter_map(|token| token.chars().next())
        .collect()
}

fn parse_timestamp(ts: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(ts).ok()
}

/// Orders ISO-8601 timestamps as instants; anything unparseable sorts after
/// every parseable value and falls back to plain string order.
pub fn compare_timestamps(a: &str, b: &str) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Stable ascending sort by timestamp.
pub fn sort_chronologically(messages: &mut [Message]) {
    messages.sort_by(|a, b| compare_timestamps(&a.timestamp, &b.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{ContactStatus, Direction};
    use serde_json::json;

    fn contact_record(fields: serde_json::Value) -> AirtableRecord<ContactFields> {
        serde_json::from_value(json!({
            "id": "recC1",
            "createdTime": "2024-03-01T09:00:00.000Z",
            "fields": fields,
        }))
        .unwrap()
    }

    fn message_record(id: &str, fields: serde_json::Value) -> AirtableRecord<MessageFields> {
        serde_json::from_value(json!({
            "id": id,
            "createdTime": "2024-03-01T09:00:00.000Z",
            "fields": fields,
        }))
        .unwrap()
    }

    #[test]
    fn contact_fields_are_renamed() {
        let record = contact_record(json!({
            "Name": "Ada Lovelace",
            "Phone": "+44 20 7946 0000",
            "Last Message": "See you at noon",
            "Last Contact Time": "2024-03-02T10:15:00.000Z",
            "Status": "Active",
        }));
        let contact = transform_contact(&record);
        assert_eq!(contact.id, "recC1");
        assert_eq!(contact.name, "Ada Lovelace");
        assert_eq!(contact.phone, "+44 20 7946 0000");
        assert_eq!(contact.last_message, "See you at noon");
        assert_eq!(contact.last_message_timestamp, "2024-03-02T10:15:00.000Z");
        assert_eq!(contact.status, ContactStatus::Active);
        assert_eq!(contact.avatar, "AL");
    }

    #[test]
    fn empty_or_absent_last_message_gets_placeholder() {
        let empty = transform_contact(&contact_record(json!({"Name": "Bob", "Last Message": ""})));
        let absent = transform_contact(&contact_record(json!({"Name": "Bob"})));
        assert_eq!(empty.last_message, NO_MESSAGES_YET);
        assert_eq!(absent.last_message, NO_MESSAGES_YET);
    }

    #[test]
    fn avatar_uses_token_initials() {
        assert_eq!(initials("grace brewster hopper"), "gbh");
        assert_eq!(initials("Linus  Torvalds"), "LT");
        assert_eq!(initials("Émile Zola"), "ÉZ");
        assert_eq!(initials(""), "??");
        assert_eq!(initials("   "), "??");
    }

    #[test]
    fn nameless_contact_gets_unknown_avatar() {
        let contact = transform_contact(&contact_record(json!({"Phone": "555"})));
        assert_eq!(contact.name, "");
        assert_eq!(contact.avatar, "??");
        assert_eq!(contact.status, ContactStatus::Inactive);
    }

    #[test]
    fn transform_is_idempotent() {
        let record = contact_record(json!({"Name": "Ada", "Status": "Inactive"}));
        assert_eq!(transform_contact(&record), transform_contact(&record));

        let record = message_record("recM1", json!({"Message Text": "hi", "Contact": ["recC1"]}));
        assert_eq!(transform_message(&record), transform_message(&record));
    }

    #[test]
    fn message_takes_first_linked_contact() {
        let record = message_record(
            "recM1",
            json!({
                "Message Text": "hello",
                "Direction": "Outgoing",
                "Timestamp": "2024-03-02T10:15:00.000Z",
                "Contact": ["recC1", "recC2"],
            }),
        );
        let message = transform_message(&record);
        assert_eq!(message.id, "recM1");
        assert_eq!(message.contact_id, "recC1");
        assert_eq!(message.text, "hello");
        assert_eq!(message.direction, Direction::Outgoing);
        assert_eq!(message.timestamp, "2024-03-02T10:15:00.000Z");
    }

    #[test]
    fn message_without_timestamp_uses_created_time() {
        let message = transform_message(&message_record("recM2", json!({"Contact": ["recC1"]})));
        assert_eq!(message.timestamp, "2024-03-01T09:00:00.000Z");
        assert_eq!(message.direction, Direction::Incoming);
    }

    #[test]
    fn chronological_sort_compares_instants() {
        let mk = |id: &str, ts: &str| Message {
            id: id.into(),
            contact_id: "recC1".into(),
            text: String::new(),
            direction: Direction::Incoming,
            timestamp: ts.into(),
        };
        let mut messages = vec![
            mk("c", "2024-03-02T12:00:00+02:00"),
            mk("x", "not a date"),
            mk("a", "2024-03-02T09:00:00Z"),
            mk("b", "2024-03-02T09:30:00Z"),
        ];
        sort_chronologically(&mut messages);
        let order: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
        // 12:00+02:00 is 10:00Z, so it lands after 09:30Z.
        assert_eq!(order, ["a", "b", "c", "x"]);
    }
}

use std::collections::HashMap;

use crate::api::models::{Contact, Message};

/// Identifies a cached read by operation and parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Contacts,
    Messages(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Contacts(Vec<Contact>),
    Messages(Vec<Message>),
}

#[derive(Debug)]
struct Entry {
    data: QueryData,
    stale: bool,
}

/// Read-through cache for backing-store queries. Stale entries keep their
/// data so views can show it while a re-fetch is in flight.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, Entry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<&QueryData> {
        self.entries.get(key).map(|e| &e.data)
    }

    pub fn set(&mut self, key: QueryKey, data: QueryData) {
        self.entries.insert(
            key,
            Entry {
                data,
                stale: false,
            },
        );
    }

    /// Marks an entry stale. Returns false when nothing was cached for `key`.
    pub fn invalidate(&mut self, key: &QueryKey) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.stale = true;
                true
            }
            None => false,
        }
    }

    /// Cached and not invalidated since the last `set`.
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|e| !e.stale)
    }

    pub fn contacts(&self) -> Option<&[Contact]> {
        match self.get(&QueryKey::Contacts) {
            Some(QueryData::Contacts(list)) => Some(list),
            _ => None,
        }
    }

    pub fn messages(&self, contact_id: &str) -> Option<&[Message]> {
        match self.get(&QueryKey::Messages(contact_id.to_string())) {
            Some(QueryData::Messages(list)) => Some(list),
            _ => None,
        }
    }
}

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::client::ApiClient;
use crate::api::models::{Contact, Message, StatusFilter};
use crate::cache::{QueryCache, QueryData, QueryKey};
use crate::utils::run_async_to_main;
use crate::view::events::{Notification, ViewEvent};
use crate::view::filter::filter_contacts;

/// `Wide` shows both panes; `Compact` shows one at a time and never
/// auto-selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Wide,
    Compact,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Wide => f.write_str("wide"),
            Layout::Compact => f.write_str("compact"),
        }
    }
}

pub struct ViewController {
    client: Arc<ApiClient>,
    cache: QueryCache,
    layout: Layout,
    selected: Option<String>,
    search: String,
    status_filter: StatusFilter,
    contacts_error: Option<String>,
    /// Latest issued request per key; older completions are dropped.
    pending: HashMap<QueryKey, u64>,
    next_seq: u64,
    sending: bool,
    notifications: VecDeque<Notification>,
    tx: UnboundedSender<ViewEvent>,
    rx: UnboundedReceiver<ViewEvent>,
}

impl ViewController {
    pub fn new(client: ApiClient, layout: Layout) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client: Arc::new(client),
            cache: QueryCache::new(),
            layout,
            selected: None,
            search: String::new(),
            status_filter: StatusFilter::All,
            contacts_error: None,
            pending: HashMap::new(),
            next_seq: 0,
            sending: false,
            notifications: VecDeque::new(),
            tx,
            rx,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Fetches contacts unless a fresh copy is cached or a fetch is in flight.
    pub fn load_contacts(&mut self) {
        let key = QueryKey::Contacts;
        if self.pending.contains_key(&key) || self.cache.is_fresh(&key) {
            return;
        }
        self.fetch_contacts();
    }

    /// Drops the error state and re-fetches everything on screen.
    pub fn refresh(&mut self) {
        self.contacts_error = None;
        self.invalidate_and_refetch(QueryKey::Contacts);
        if let Some(id) = self.selected.clone() {
            self.invalidate_and_refetch(QueryKey::Messages(id));
        }
    }

    fn fetch_contacts(&mut self) {
        let seq = self.issue(QueryKey::Contacts);
        let client = self.client.clone();
        debug!("fetching contacts (#{seq})");
        run_async_to_main(&self.tx, async move {
            ViewEvent::ContactsLoaded {
                seq,
                result: client.fetch_contacts().await,
            }
        });
    }

    /// Fetches messages for the selection. With nothing selected no request
    /// is made at all.
    fn load_messages(&mut self) {
        let Some(contact_id) = self.selected.clone() else {
            return;
        };
        let key = QueryKey::Messages(contact_id.clone());
        if self.pending.contains_key(&key) || self.cache.is_fresh(&key) {
            return;
        }
        self.fetch_messages(contact_id);
    }

    fn fetch_messages(&mut self, contact_id: String) {
        let seq = self.issue(QueryKey::Messages(contact_id.clone()));
        let client = self.client.clone();
        debug!("fetching messages for {contact_id} (#{seq})");
        run_async_to_main(&self.tx, async move {
            let result = client.fetch_messages(&contact_id).await;
            ViewEvent::MessagesLoaded {
                seq,
                contact_id,
                result,
            }
        });
    }

    fn issue(&mut self, key: QueryKey) -> u64 {
        self.next_seq += 1;
        self.pending.insert(key, self.next_seq);
        self.next_seq
    }

    /// Marks `key` stale and, if it is on screen, re-fetches it. The new
    /// request supersedes any older one still in flight.
    fn invalidate_and_refetch(&mut self, key: QueryKey) {
        self.cache.invalidate(&key);
        match key {
            QueryKey::Contacts => self.fetch_contacts(),
            QueryKey::Messages(id) => {
                if self.selected.as_deref() == Some(id.as_str()) {
                    self.fetch_messages(id);
                }
            }
        }
    }

    /// Selects a contact by id. Returns false if it is not in the list.
    pub fn select_contact(&mut self, contact_id: &str) -> bool {
        if self.contact(contact_id).is_none() {
            warn!("select: unknown contact {contact_id}");
            return false;
        }
        if self.selected.as_deref() != Some(contact_id) {
            debug!("selected {contact_id}");
            self.selected = Some(contact_id.to_string());
        }
        self.load_messages();
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn contacts(&self) -> &[Contact] {
        self.cache.contacts().unwrap_or(&[])
    }

    pub fn contact(&self, contact_id: &str) -> Option<&Contact> {
        self.contacts().iter().find(|c| c.id == contact_id)
    }

    /// Contacts passing the current search text and status filter.
    pub fn visible_contacts(&self) -> Vec<&Contact> {
        filter_contacts(self.contacts(), &self.search, self.status_filter)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_contact(&self) -> Option<&Contact> {
        self.selected.as_deref().and_then(|id| self.contact(id))
    }

    pub fn messages(&self) -> &[Message] {
        self.selected
            .as_deref()
            .and_then(|id| self.cache.messages(id))
            .unwrap_or(&[])
    }

    pub fn is_loading_contacts(&self) -> bool {
        self.pending.contains_key(&QueryKey::Contacts) && self.cache.contacts().is_none()
    }

    pub fn is_loading_messages(&self) -> bool {
        match self.selected.as_deref() {
            Some(id) => {
                self.pending.contains_key(&QueryKey::Messages(id.to_string()))
                    && self.cache.messages(id).is_none()
            }
            None => false,
        }
    }

    /// Set when the contacts fetch failed; the view shows only this.
    pub fn contacts_error(&self) -> Option<&str> {
        self.contacts_error.as_deref()
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    #[cfg(test)]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Sends `text` to the selected contact. Returns false when nothing was
    /// sent: blank text, no selection, or a send still in flight.
    pub fn send_message(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.sending {
            return false;
        }
        let Some(contact_id) = self.selected.clone() else {
            return false;
        };
        self.sending = true;
        let client = self.client.clone();
        let text = text.to_string();
        debug!("sending message to {contact_id}");
        run_async_to_main(&self.tx, async move {
            let result = client.send_message(&contact_id, &text).await;
            ViewEvent::MessageSent { contact_id, result }
        });
        true
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    /// Nothing in flight.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && !self.sending
    }

    pub async fn recv_event(&mut self) -> Option<ViewEvent> {
        self.rx.recv().await
    }

    /// Applies events until no request is outstanding.
    pub async fn settle(&mut self) {
        while !self.is_idle() {
            match self.rx.recv().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
    }

    /// Removes the pending marker for `key` if `seq` is the latest request.
    fn complete(&mut self, key: &QueryKey, seq: u64) -> bool {
        if self.pending.get(key) == Some(&seq) {
            self.pending.remove(key);
            true
        } else {
            false
        }
    }

    pub fn handle_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::ContactsLoaded { seq, result } => {
                if !self.complete(&QueryKey::Contacts, seq) {
                    debug!("dropping superseded contacts result #{seq}");
                    return;
                }
                match result {
                    Ok(contacts) => {
                        info!("loaded {} contacts", contacts.len());
                        self.contacts_error = None;
                        let first = contacts.first().map(|c| c.id.clone());
                        self.cache.set(QueryKey::Contacts, QueryData::Contacts(contacts));
                        let removed = self
                            .selected
                            .as_deref()
                            .is_some_and(|id| self.contact(id).is_none());
                        if removed {
                            info!("selected contact no longer listed; clearing selection");
                            self.selected = None;
                        }
                        if self.layout == Layout::Wide && self.selected.is_none() {
                            if let Some(id) = first {
                                self.select_contact(&id);
                            }
                        }
                    }
                    Err(e) => {
                        warn!("contacts: {e}");
                        self.contacts_error = Some(e.operation().failure_text().to_string());
                    }
                }
            }
            ViewEvent::MessagesLoaded {
                seq,
                contact_id,
                result,
            } => {
                let key = QueryKey::Messages(contact_id.clone());
                if !self.complete(&key, seq) {
                    debug!("dropping superseded messages result #{seq} for {contact_id}");
                    return;
                }
                if self.selected.as_deref() != Some(contact_id.as_str()) {
                    debug!("dropping messages for {contact_id}: no longer selected");
                    return;
                }
                match result {
                    Ok(messages) => {
                        debug!("loaded {} messages for {contact_id}", messages.len());
                        self.cache.set(key, QueryData::Messages(messages));
                    }
                    Err(e) => warn!("messages for {contact_id}: {e}"),
                }
            }
            ViewEvent::MessageSent { contact_id, result } => {
                self.sending = false;
                match result {
                    Ok(()) => {
                        info!("message sent to {contact_id}");
                        self.notifications.push_back(Notification::info("Message sent."));
                        self.invalidate_and_refetch(QueryKey::Messages(contact_id));
                        self.invalidate_and_refetch(QueryKey::Contacts);
                    }
                    Err(e) => {
                        warn!("send to {contact_id}: {e}");
                        self.notifications.push_back(Notification::error(e.user_message()));
                    }
                }
            }
        }
    }
}

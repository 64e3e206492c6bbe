use log::{debug, warn};
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::models::{
    AirtableRecord, Contact, ContactFields, CreateRecord, Direction, ErrorBody, Message,
    MessageFields, OutgoingMessageFields, RecordPage,
};
use crate::api::transform::{sort_chronologically, transform_contact, transform_message};
use crate::app::Config;
use crate::error::{ConfigError, NetworkError, Operation};

pub struct ApiClient {
    pub http: HttpClient,
    api_key: String,
    contacts_url: Url,
    messages_url: Url,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let base = Url::parse(&config.api_url).map_err(|e| ConfigError::InvalidUrl {
            url: config.api_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            http: HttpClient::builder().build()?,
            api_key: config.api_key.clone(),
            contacts_url: table_url(&base, &config.base_id, &config.contacts_table_id)?,
            messages_url: table_url(&base, &config.base_id, &config.messages_table_id)?,
        })
    }

    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.api_key)
    }

    /// Contacts, most recent conversation first, in the order Airtable returns them.
    pub async fn fetch_contacts(&self) -> Result<Vec<Contact>, NetworkError> {
        let query = [
            ("sort[0][field]", "Last Contact Time".to_string()),
            ("sort[0][direction]", "desc".to_string()),
        ];
        let records: Vec<AirtableRecord<ContactFields>> = self
            .list_records(Operation::FetchContacts, &self.contacts_url, &query)
            .await?;
        Ok(records.iter().map(transform_contact).collect())
    }

    /// Messages linked to `contact_id`, oldest first.
    pub async fn fetch_messages(&self, contact_id: &str) -> Result<Vec<Message>, NetworkError> {
        let query = [
            ("sort[0][field]", "Created Time".to_string()),
            ("sort[0][direction]", "asc".to_string()),
            ("filterByFormula", contact_formula(contact_id)),
        ];
        let records: Vec<AirtableRecord<MessageFields>> = self
            .list_records(Operation::FetchMessages, &self.messages_url, &query)
            .await?;
        let mut messages: Vec<Message> = records.iter().map(transform_message).collect();
        sort_chronologically(&mut messages);
        Ok(messages)
    }

    /// Creates an outgoing message record with the `Send` flag set. The
    /// created record is not returned; re-fetch to see it.
    pub async fn send_message(&self, contact_id: &str, text: &str) -> Result<(), NetworkError> {
        let op = Operation::SendMessage;
        let body = CreateRecord {
            fields: OutgoingMessageFields {
                text,
                direction: Direction::Outgoing,
                contact: [contact_id],
                send: true,
            },
        };
        let req = self.with_auth(self.http.post(self.messages_url.clone())).json(&body);
        let resp = req
            .send()
            .await
            .map_err(|source| NetworkError::Transport { op, source })?;
        check_status(op, resp).await?;
        debug!("created outgoing message for {contact_id}");
        Ok(())
    }

    /// GETs every page of a table listing, following `offset` tokens.
    async fn list_records<T: DeserializeOwned>(
        &self,
        op: Operation,
        url: &Url,
        query: &[(&str, String)],
    ) -> Result<Vec<AirtableRecord<T>>, NetworkError> {
        let mut out = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let mut req = self.with_auth(self.http.get(url.clone())).query(query);
            if let Some(token) = &offset {
                req = req.query(&[("offset", token)]);
            }
            let resp = req
                .send()
                .await
                .map_err(|source| NetworkError::Transport { op, source })?;
            let resp = check_status(op, resp).await?;
            let page: RecordPage<T> = resp
                .json()
                .await
                .map_err(|source| NetworkError::Decode { op, source })?;
            out.extend(page.records);
            match page.offset {
                Some(next) if offset.as_deref() == Some(next.as_str()) => {
                    warn!("{op}: server repeated offset {next}, stopping pagination");
                    break;
                }
                Some(next) if !next.is_empty() => offset = Some(next),
                _ => break,
            }
        }
        debug!("{op}: {} records", out.len());
        Ok(out)
    }
}

fn table_url(base: &Url, base_id: &str, table_id: &str) -> Result<Url, ConfigError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ConfigError::InvalidUrl {
            url: base.to_string(),
            reason: "cannot be a base".into(),
        })?
        .pop_if_empty()
        .push(base_id)
        .push(table_id);
    Ok(url)
}

/// `{Contact}='<id>'` with the id escaped for a single-quoted formula string.
fn contact_formula(contact_id: &str) -> String {
    let escaped = contact_id.replace('\\', "\\\\").replace('\'', "\\'");
    format!("{{Contact}}='{escaped}'")
}

async fn check_status(op: Operation, resp: Response) -> Result<Response, NetworkError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = match resp.text().await {
        Ok(body) => serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error.into_message()),
        Err(_) => None,
    };
    warn!("{op}: HTTP {status} {}", message.as_deref().unwrap_or(""));
    Err(NetworkError::Status {
        op,
        status: status.as_u16(),
        message,
    })
}

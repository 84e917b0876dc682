//! HTTP table API client
//!
//! Records are addressed as `{base_url}/tables/{table}/records[/{id}]` and
//! wrapped in a `{"data": ...}` envelope in both directions.
//!
//! The API key is held as a [`SecretString`] and only exposed when the bearer
//! header is built; reqwest marks that header as sensitive so it is not
//! printed by its own debug logging.

use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use super::DataClient;
use super::mapping::RemoteRecord;
use crate::entity::Entity;
use crate::error::{BugHiveError, Result};
use crate::patch::MergePolicy;
use crate::types::{EntityId, Timestamp};

/// Connection settings for the remote table API
#[derive(Clone, Serialize, Deserialize)]
pub struct RestSettings {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_timeout() -> u64 {
    30
}

impl fmt::Debug for RestSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RestSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        RestSettings {
            base_url: base_url.into(),
            api_key: None,
            timeout: default_timeout(),
        }
    }

    /// Build the shared HTTP client for these settings
    pub fn http_client(&self) -> Result<Client> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(self.timeout))
            .build()?)
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Value,
}

/// Remote [`DataClient`] for one table
pub struct RestClient<E> {
    http: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    policy: MergePolicy,
    _entity: PhantomData<fn() -> E>,
}

impl<E> fmt::Debug for RestClient<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> RestClient<E> {
    pub fn new(http: Client, settings: &RestSettings, policy: MergePolicy) -> Result<Self> {
        let mut base = settings.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| {
            BugHiveError::Config(format!("invalid base_url '{}': {e}", settings.base_url))
        })?;

        Ok(RestClient {
            http,
            base_url,
            api_key: settings
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .map(SecretString::from),
            policy,
            _entity: PhantomData,
        })
    }
}

impl<E: RemoteRecord> RestClient<E> {
    fn records_url(&self) -> Result<Url> {
        self.base_url
            .join(&format!("tables/{}/records", E::TABLE))
            .map_err(|e| BugHiveError::Config(format!("invalid table url: {e}")))
    }

    fn record_url(&self, id: &EntityId) -> Result<Url> {
        let mut url = self.records_url()?;
        url.path_segments_mut()
            .map_err(|_| BugHiveError::Config("base_url cannot be a base".to_string()))?
            .push(id.as_str());
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and unwrap the `data` envelope
    async fn send(&self, builder: RequestBuilder, id: Option<&EntityId>) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND
            && let Some(id) = id
        {
            warn!(kind = %E::KIND, %id, "record not found");
            return Err(BugHiveError::not_found(E::KIND, id.as_str()));
        }

        // Precondition failures only happen on versioned writes; the caller
        // fills in the versions.
        if matches!(status, StatusCode::PRECONDITION_FAILED | StatusCode::CONFLICT)
            && let Some(id) = id
        {
            return Err(BugHiveError::Conflict {
                kind: E::KIND,
                id: id.to_string(),
                expected: 0,
                actual: 0,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(kind = %E::KIND, %status, "remote call failed");
            return Err(BugHiveError::Service(format!(
                "{} API error ({status}): {}",
                E::TABLE,
                body.trim()
            )));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let envelope: Envelope = response.json().await?;
        Ok(envelope.data)
    }
}

impl<E: RemoteRecord> DataClient<E> for RestClient<E> {
    async fn fetch_all(&self) -> Result<Vec<E>> {
        let url = self.records_url()?;
        let data = self.send(self.request(Method::GET, url), None).await?;
        let records = match data {
            Value::Array(items) => items
                .into_iter()
                .map(E::from_raw)
                .collect::<Result<Vec<_>>>()?,
            Value::Null => Vec::new(),
            other => vec![E::from_raw(other)?],
        };
        debug!(kind = %E::KIND, count = records.len(), "fetched all");
        Ok(records)
    }

    async fn fetch(&self, id: &EntityId) -> Result<E> {
        let url = self.record_url(id)?;
        let data = self.send(self.request(Method::GET, url), Some(id)).await?;
        if data.is_null() {
            return Err(BugHiveError::not_found(E::KIND, id.as_str()));
        }
        E::from_raw(data)
    }

    async fn insert(&self, draft: E::Draft) -> Result<E> {
        let url = self.records_url()?;
        let body = json!({ "data": E::draft_to_raw(&draft, Timestamp::now()) });
        let data = self
            .send(self.request(Method::POST, url).json(&body), None)
            .await?;
        let record = E::from_raw(data)?;
        debug!(kind = %E::KIND, id = %record.id(), "inserted");
        Ok(record)
    }

    async fn update(&self, id: &EntityId, patch: E::Patch, expected_version: Option<u64>) -> Result<E> {
        if let Some(expected) = expected_version {
            let current = self.fetch(id).await?;
            let actual = current.version();
            if actual != expected {
                warn!(kind = %E::KIND, %id, expected, actual, "version conflict");
                return Err(BugHiveError::Conflict {
                    kind: E::KIND,
                    id: id.to_string(),
                    expected,
                    actual,
                });
            }
        }

        let url = self.record_url(id)?;
        let body = json!({ "data": E::patch_to_raw(&patch, self.policy, Timestamp::now()) });
        let mut builder = self.request(Method::PATCH, url).json(&body);
        if let Some(expected) = expected_version {
            builder = builder.header(header::IF_MATCH, expected.to_string());
        }

        match self.send(builder, Some(id)).await {
            Ok(Value::Null) => self.fetch(id).await,
            Ok(data) => E::from_raw(data),
            Err(e) if e.is_conflict() => {
                let actual = self.fetch(id).await?.version();
                warn!(kind = %E::KIND, %id, actual, "remote rejected versioned write");
                Err(BugHiveError::Conflict {
                    kind: E::KIND,
                    id: id.to_string(),
                    expected: expected_version.unwrap_or(actual),
                    actual,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn remove(&self, id: &EntityId) -> Result<()> {
        let url = self.record_url(id)?;
        self.send(self.request(Method::DELETE, url), Some(id)).await?;
        debug!(kind = %E::KIND, %id, "removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Ticket;

    fn client(base: &str) -> Result<RestClient<Ticket>> {
        RestClient::new(Client::new(), &RestSettings::new(base), MergePolicy::Explicit)
    }

    #[test]
    fn test_record_urls() {
        let client = client("https://api.example.com/v1").unwrap();
        assert_eq!(
            client.records_url().unwrap().as_str(),
            "https://api.example.com/v1/tables/ticket/records"
        );
        assert_eq!(
            client.record_url(&EntityId::new("42")).unwrap().as_str(),
            "https://api.example.com/v1/tables/ticket/records/42"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = client("not a url").unwrap_err();
        assert!(matches!(err, BugHiveError::Config(_)));
    }

    #[test]
    fn test_settings_debug_redacts_key() {
        let mut settings = RestSettings::new("https://api.example.com");
        settings.api_key = Some("sk_live_secret".to_string());
        let debug = format!("{settings:?}");
        assert!(!debug.contains("sk_live_secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}

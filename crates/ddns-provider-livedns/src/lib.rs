// # LiveDNS Provider
//
// This crate provides the LiveDNS REST API client for the DDNS updater.
//
// ## Implementation Notes
//
// - ✅ One HTTP request per trait method
// - ✅ Full error propagation to the engine, with the provider's response
//   body kept in the error text
// - ✅ HTTP timeout configured (60 seconds)
// - ✅ Specific error handling for HTTP status codes (401/403, 404, 429, 5xx)
// - ✅ Both A and AAAA records
// - ❌ NO retry logic (a run is single-pass; rerunning is the scheduler's job)
// - ❌ NO snapshot decisions (owned by ReconciliationEngine)
// - ❌ NO caching
//
// ## Security Requirements
//
// - API key NEVER appears in logs or `Debug` output
// - Client construction fails fast if the key is empty
//
// ## API Reference
//
// All paths are relative to the configured base URL, the domain is
// addressed by name:
//
// - List records: GET `/domains/:domain/records`
// - Upsert record: PUT `/domains/:domain/records/:name/:type`
// - Create snapshot: POST `/domains/:domain/snapshots`
// - Delete snapshot: DELETE `/domains/:domain/snapshots/:id`
// - Reverse DNS: POST `/domains/:domain/ptr`

use async_trait::async_trait;
use ddns_core::config::{ApiConfig, AuthScheme};
use ddns_core::records::{DesiredRecord, RemoteRecord, Snapshot};
use ddns_core::traits::DnsClient;
use ddns_core::{Error, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

/// Provider name used in errors and logs
const PROVIDER: &str = "livedns";

/// Default HTTP timeout for API requests (60 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Response of a snapshot creation
#[derive(Debug, Deserialize)]
struct SnapshotCreated {
    id: String,
}

/// LiveDNS client
///
/// # Trust Level: Untrusted
///
/// Stateless and single-shot. Every decision (whether to write, when to
/// snapshot, what a failure means for the run) is owned by
/// `ReconciliationEngine`.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API key.
pub struct LiveDnsClient {
    /// API base URL, without trailing slash
    base_url: String,

    /// API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// How the key is presented in the `Authorization` header
    auth: AuthScheme,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for LiveDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveDnsClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<REDACTED>")
            .field("auth", &self.auth)
            .finish()
    }
}

impl LiveDnsClient {
    /// Create a new LiveDNS client
    ///
    /// # Parameters
    ///
    /// - `base_url`: API base URL (e.g., "https://api.gandi.net/v5/livedns")
    /// - `api_key`: API key with DNS read/write permissions
    /// - `auth`: Authorization scheme for the key
    ///
    /// # Security
    ///
    /// The API key will NEVER be logged or displayed in error messages.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        auth: AuthScheme,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("LiveDNS API key cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            auth,
            client,
        })
    }

    /// Create a client from the `[api]` configuration section
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(config.url.clone(), config.key.clone(), config.auth)
    }

    /// Build an endpoint URL from path segments
    ///
    /// Each segment is percent-encoded, so record names such as `@` or
    /// `*` are safe to pass as is.
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    /// Start an authenticated request
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let authorization = match self.auth {
            AuthScheme::Apikey => format!("Apikey {}", self.api_key),
            AuthScheme::Bearer => format!("Bearer {}", self.api_key),
        };

        self.client
            .request(method, url)
            .header("Authorization", authorization)
            .header("X-Api-Key", &self.api_key)
            .header("Accept", "application/json")
    }

    /// Send a request and turn non-success statuses into errors
    ///
    /// `context` names the operation for error messages.
    async fn send(&self, builder: RequestBuilder, context: &str) -> Result<Response> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::http(format!("{}: request timed out", context))
            } else {
                Error::http(format!("{}: HTTP request failed: {}", context, e))
            }
        })?;

        let status = response.status();
        tracing::debug!("{}: response status {}", context, status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(Error::from_status(
                PROVIDER,
                context,
                status.as_u16(),
                &error_text,
            ));
        }

        Ok(response)
    }
}

#[async_trait]
impl DnsClient for LiveDnsClient {
    /// List every record of the zone
    ///
    /// ```http
    /// GET /domains/example.com/records
    /// ```
    async fn list_records(&self, domain: &str) -> Result<Vec<RemoteRecord>> {
        let url = self.endpoint(&["domains", domain, "records"]);
        tracing::debug!("GET {}", url);

        let response = self
            .send(self.request(Method::GET, &url), "list records")
            .await
            .map_err(|e| Error::list(e.to_string()))?;

        response
            .json::<Vec<RemoteRecord>>()
            .await
            .map_err(|e| Error::list(format!("Failed to parse record list: {}", e)))
    }

    /// Create a snapshot of the zone
    ///
    /// ```http
    /// POST /domains/example.com/snapshots
    /// { "name": "ddns-update snapshot ..." }
    /// ```
    async fn create_snapshot(&self, domain: &str, name: &str) -> Result<Snapshot> {
        let url = self.endpoint(&["domains", domain, "snapshots"]);
        tracing::debug!("POST {}", url);

        let response = self
            .send(
                self.request(Method::POST, &url)
                    .json(&serde_json::json!({ "name": name })),
                "create snapshot",
            )
            .await
            .map_err(|e| Error::snapshot(e.to_string()))?;

        let created: SnapshotCreated = response
            .json()
            .await
            .map_err(|e| Error::snapshot(format!("Failed to parse snapshot response: {}", e)))?;

        Ok(Snapshot::new(created.id))
    }

    /// Delete a snapshot
    ///
    /// ```http
    /// DELETE /domains/example.com/snapshots/:id
    /// ```
    async fn delete_snapshot(&self, domain: &str, snapshot: &Snapshot) -> Result<()> {
        let url = self.endpoint(&["domains", domain, "snapshots", snapshot.id.as_str()]);
        tracing::debug!("DELETE {}", url);

        self.send(self.request(Method::DELETE, &url), "delete snapshot")
            .await?;
        Ok(())
    }

    /// Replace the value set and TTL of one record
    ///
    /// ```http
    /// PUT /domains/example.com/records/www/A
    /// { "rrset_ttl": 3600, "rrset_values": ["203.0.113.5"] }
    /// ```
    async fn write_record(&self, domain: &str, record: &DesiredRecord) -> Result<()> {
        let url = self.endpoint(&[
            "domains",
            domain,
            "records",
            record.name.as_str(),
            record.record_type.as_str(),
        ]);
        tracing::debug!("PUT {}", url);

        let payload = serde_json::json!({
            "rrset_ttl": record.ttl,
            "rrset_values": record.values,
        });

        let response = self
            .send(
                self.request(Method::PUT, &url).json(&payload),
                &format!("write record {}/{}", record.name, record.record_type),
            )
            .await
            .map_err(|e| Error::update(e.to_string()))?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("API response: {}", body);
        }
        Ok(())
    }

    /// Request a reverse DNS update for the apex address
    ///
    /// ```http
    /// POST /domains/example.com/ptr
    /// { "ip": "203.0.113.5", "name": "@" }
    /// ```
    async fn trigger_ptr_update(&self, domain: &str, ip: IpAddr) -> Result<()> {
        let url = self.endpoint(&["domains", domain, "ptr"]);
        tracing::debug!("POST {}", url);

        self.send(
            self.request(Method::POST, &url)
                .json(&serde_json::json!({ "ip": ip.to_string(), "name": "@" })),
            "reverse DNS update",
        )
        .await?;
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

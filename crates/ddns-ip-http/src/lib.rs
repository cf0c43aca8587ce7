// # HTTP IP Resolver
//
// This crate provides the HTTP-based IP resolver for the DDNS updater.
//
// ## Behavior
//
// - GET the primary resolver URL
// - On a transport error, timeout, or non-2xx status, GET the alternate URL
//   once (when one is configured)
// - The body is either a bare address (`203.0.113.5\n`) or a page that
//   embeds one; in the latter case the first IPv4-shaped token is used
//
// Content errors (empty body, no address, `999.1.1.1`) are not a reason to
// fall back: the endpoint answered, it just answered something unusable.
//
// ## Resolver Services
//
// Any endpoint returning plain text works, e.g. `https://api.ipify.org`,
// `https://ifconfig.me/ip`, `https://icanhazip.com`.

use ddns_core::config::IpConfig;
use ddns_core::traits::IpResolver;
use ddns_core::{Error, Result};

use regex::Regex;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::LazyLock;
use std::time::Duration;

/// First IPv4-shaped token of a page
static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})").expect("IPv4 pattern is valid")
});

/// HTTP-based IP resolver with a single alternate fallback
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    /// Primary resolver URL
    url: String,

    /// Alternate resolver URL
    alt_url: Option<String>,

    /// HTTP client (carries the per-request timeout)
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a new HTTP IP resolver
    ///
    /// # Parameters
    ///
    /// - `url`: Primary URL (e.g., "https://api.ipify.org")
    /// - `alt_url`: Alternate URL tried once if the primary fails
    /// - `timeout`: Per-request timeout; a timeout counts as a failure
    pub fn new(url: impl Into<String>, alt_url: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            alt_url,
            client,
        })
    }

    /// Create a resolver from the `[ip]` configuration section
    pub fn from_config(config: &IpConfig) -> Result<Self> {
        Self::new(
            config.resolver_url.clone(),
            config.resolver_url_alt.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Fetch the body of a resolver URL
    ///
    /// Fails on transport errors, timeouts, and non-2xx statuses; these
    /// are the failures that justify trying the alternate.
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::resolution(format!("{} timed out", url))
            } else {
                Error::resolution(format!("request to {} failed: {}", url, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::resolution(format!(
                "{} returned an error code HTTP/{}",
                url,
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::resolution(format!("failed to read response of {}: {}", url, e)))
    }
}

/// Extract the address from a resolver response body
///
/// A bare address (IPv4 or IPv6, surrounding whitespace allowed) is taken
/// as is. Otherwise the first IPv4-shaped token is used, and must be a
/// valid IPv4 address.
pub fn extract_ip(body: &str) -> Result<IpAddr> {
    let body = body.trim();
    if body.is_empty() {
        return Err(Error::resolution("Invalid content returned by IP resolver"));
    }

    if let Ok(ip) = body.parse::<IpAddr>() {
        return Ok(ip);
    }

    let token = IPV4_PATTERN
        .find(body)
        .ok_or_else(|| Error::resolution("IP not found in resolver content"))?
        .as_str();

    token
        .parse::<Ipv4Addr>()
        .map(IpAddr::V4)
        .map_err(|_| Error::resolution(format!("Invalid IP address in resolver content: {}", token)))
}

#[async_trait::async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        let body = match self.fetch(&self.url).await {
            Ok(body) => body,
            Err(e) => match self.alt_url {
                Some(ref alt_url) => {
                    tracing::warn!("Main resolver failed ({}), trying alternate resolver", e);
                    self.fetch(alt_url).await.map_err(|alt_err| {
                        Error::resolution(format!(
                            "main resolver: {}; alternate resolver: {}",
                            e, alt_err
                        ))
                    })?
                }
                None => return Err(e),
            },
        };

        let ip = extract_ip(&body)?;
        tracing::debug!("Resolver returned {}", ip);
        Ok(ip)
    }

    fn resolver_name(&self) -> &'static str {
        "http"
    }
}

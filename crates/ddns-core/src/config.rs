//! Configuration types for the DDNS updater
//!
//! The configuration is read once at startup (TOML, sections `[api]`,
//! `[dns]` and `[ip]`) and then handed to the engine by reference. Nothing in
//! the crate mutates it during a run.
//!
//! ```toml
//! [api]
//! url = "https://api.gandi.net/v5/livedns"
//! key = "..."
//!
//! [dns]
//! domain = "example.com"
//! records = "@,www"
//! ttl = 3600
//! update_ptr = false
//!
//! [ip]
//! resolver_url = "https://api.ipify.org"
//! resolver_url_alt = "https://ifconfig.me/ip"
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// Environment variable overriding `api.key`
pub const API_KEY_ENV: &str = "DDNS_API_KEY";

/// Provider bounds for the record TTL, in seconds
const MIN_TTL: u32 = 300;
const MAX_TTL: u32 = 2_592_000;

/// Second-level labels that belong to the public suffix under a ccTLD
/// (`example.co.uk`, `example.com.au`, ...)
const SECOND_LEVEL_SUFFIXES: &[&str] = &["co", "com", "net", "org", "gov", "edu", "ac", "ne", "or"];

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Provider API settings
    pub api: ApiConfig,

    /// Managed zone and records
    pub dns: DnsConfig,

    /// Public IP resolver endpoints
    pub ip: IpConfig,

    /// Compute and report changes without performing them
    ///
    /// Not read from the file; set from the command line.
    #[serde(default, skip_serializing)]
    pub dry_run: bool,
}

impl DdnsConfig {
    /// Parse a TOML configuration document
    pub fn from_toml_str(content: &str) -> Result<Self, crate::Error> {
        toml::from_str(content).map_err(|e| crate::Error::config(e.to_string()))
    }

    /// Apply environment overrides (`DDNS_API_KEY`)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            self.api.key = key;
        }
        self
    }

    /// Set the dry-run flag
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Reduce the configured domain to its apex
    ///
    /// Records are addressed relative to the zone, so `home.example.com`
    /// is managed as zone `example.com`.
    pub fn normalize_domain(mut self) -> Self {
        let apex = apex_domain(&self.dns.domain);
        if apex != self.dns.domain {
            tracing::warn!(
                "Removing sub-domain part of {}, managing zone {}",
                self.dns.domain,
                apex
            );
            self.dns.domain = apex;
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.api.validate()?;
        self.dns.validate()?;
        self.ip.validate()?;
        Ok(())
    }
}

/// Authorization scheme used for the provider API key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Apikey <key>`
    #[default]
    Apikey,
    /// `Authorization: Bearer <key>` (personal access tokens)
    Bearer,
}

/// Provider API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the provider API
    pub url: String,

    /// API key
    /// ⚠️ NEVER log this value
    pub key: String,

    /// How the key is presented in the `Authorization` header
    #[serde(default)]
    pub auth: AuthScheme,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("url", &self.url)
            .field("key", &"<REDACTED>")
            .field("auth", &self.auth)
            .finish()
    }
}

impl ApiConfig {
    fn validate(&self) -> Result<(), crate::Error> {
        validate_url("api.url", &self.url)?;
        if self.key.is_empty() {
            return Err(crate::Error::config(format!(
                "api.key cannot be empty (set it in the file or via {})",
                API_KEY_ENV
            )));
        }
        Ok(())
    }
}

/// Managed zone configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    /// Domain (zone) name
    pub domain: String,

    /// Record names to manage, in update order
    ///
    /// Accepts `"@,www"` or `["@", "www"]`.
    #[serde(deserialize_with = "deserialize_records")]
    pub records: Vec<String>,

    /// TTL written to every managed record, in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Trigger the provider's reverse-DNS update when `@` changes
    #[serde(default)]
    pub update_ptr: bool,
}

impl DnsConfig {
    fn validate(&self) -> Result<(), crate::Error> {
        if self.domain.is_empty() {
            return Err(crate::Error::config("dns.domain cannot be empty"));
        }
        if self.records.is_empty() {
            return Err(crate::Error::config(
                "No records to update, check dns.records",
            ));
        }
        if !(MIN_TTL..=MAX_TTL).contains(&self.ttl) {
            return Err(crate::Error::config(format!(
                "dns.ttl must be between {} and {} seconds. Got: {}",
                MIN_TTL, MAX_TTL, self.ttl
            )));
        }
        Ok(())
    }
}

/// IP resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpConfig {
    /// Primary resolver URL
    pub resolver_url: String,

    /// Alternate resolver URL, tried once when the primary fails
    #[serde(default)]
    pub resolver_url_alt: Option<String>,

    /// Per-request timeout, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl IpConfig {
    fn validate(&self) -> Result<(), crate::Error> {
        validate_url("ip.resolver_url", &self.resolver_url)?;
        if let Some(ref alt) = self.resolver_url_alt {
            validate_url("ip.resolver_url_alt", alt)?;
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("ip.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

fn default_ttl() -> u32 {
    3600
}

fn default_timeout_secs() -> u64 {
    30
}

fn validate_url(option: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{} cannot be empty", option)));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            option, url
        )));
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordList {
    Csv(String),
    List(Vec<String>),
}

fn deserialize_records<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let names: Vec<String> = match RecordList::deserialize(deserializer)? {
        RecordList::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        RecordList::List(list) => list,
    };

    let mut records: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !records.iter().any(|r| r == name) {
            records.push(name.to_string());
        }
    }
    Ok(records)
}

/// Registrable apex of a domain name
///
/// `www.example.com` → `example.com`, `a.example.co.uk` → `example.co.uk`.
pub fn apex_domain(domain: &str) -> String {
    let domain = domain.trim_end_matches('.');
    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 3 {
        return domain.to_string();
    }

    let tld = parts[parts.len() - 1];
    let sld = parts[parts.len() - 2];
    let keep = if tld.len() == 2 && SECOND_LEVEL_SUFFIXES.contains(&sld) {
        3
    } else {
        2
    };

    parts[parts.len().saturating_sub(keep)..].join(".")
}

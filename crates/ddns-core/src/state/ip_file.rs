// # IP Output File
//
// Keeps the last resolved public IP in a plain text file, one line.
//
// ## Purpose
//
// Other local tooling (firewall rules, VPN configs) can read the current
// public address without querying a resolver themselves. The file is only
// rewritten when the address actually changes, so its mtime tells when the
// IP last moved.
//
// ## Crash Safety
//
// - Atomic writes: new content goes to a `.tmp` sibling, then is renamed
// - A missing or unreadable file is treated as "no previous IP"

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;

/// Plain text file holding the last resolved IP
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::state::IpFile;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let file = IpFile::new("/var/lib/ddns/ip.txt");
///
///     // Written only if different from the current content
///     let changed = file.record("203.0.113.5".parse()?).await?;
///     assert_eq!(file.read().await?, Some("203.0.113.5".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct IpFile {
    path: PathBuf,
}

impl IpFile {
    /// Create a handle on `path`; nothing is read or written yet
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First line of the file, trimmed
    ///
    /// `None` if the file does not exist or is empty.
    pub async fn read(&self) -> Result<Option<String>, Error> {
        if !self.path.exists() {
            tracing::debug!("IP file does not exist: {}", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await?;
        Ok(content
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string))
    }

    /// Store `ip` unless the file already holds it
    ///
    /// # Returns
    ///
    /// `true` if the file was (re)written.
    pub async fn record(&self, ip: IpAddr) -> Result<bool, Error> {
        let ip = ip.to_string();

        match self.read().await {
            Ok(Some(previous)) if previous == ip => {
                tracing::debug!("IP file {} already holds {}", self.path.display(), ip);
                return Ok(false);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    "Could not read IP file {}: {}. Overwriting it.",
                    self.path.display(),
                    e
                );
            }
        }

        self.write_atomic(&format!("{}\n", ip)).await?;
        tracing::info!("Wrote {} to {}", ip, self.path.display());
        Ok(true)
    }

    /// Write to a temporary sibling, then rename over the file
    async fn write_atomic(&self, content: &str) -> Result<(), Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(content.as_bytes()).await?;
            file.flush().await?;
        }

        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

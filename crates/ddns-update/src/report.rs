// # Run report
//
// Folds the engine's events and the final `Outcome` into the one-line
// summary printed at the end of a run:
//
// ```text
// 2024-01-15 12:00:00 - Local IP: 203.0.113.5, updated: @/A, www/A [UPDATE]
// ```
//
// The same line is appended to the `--log` file when one is given.

use chrono::{DateTime, Local};
use ddns_core::engine::EngineEvent;
use ddns_core::{Outcome, RecordChange};
use std::net::IpAddr;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Timestamp format of the terminal line
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What a run observed, rebuilt from engine events
#[derive(Debug, Default)]
pub struct RunReport {
    ip: Option<IpAddr>,
    changes: Vec<RecordChange>,
    unchanged: Vec<String>,
    dry_run: bool,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Record one engine event
    pub fn observe(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::IpResolved { ip } => self.ip = Some(ip),
            EngineEvent::RecordChanged { change } => self.changes.push(change),
            EngineEvent::RecordUnchanged { name } => self.unchanged.push(name),
            _ => {}
        }
    }

    /// Resolved IP, if resolution succeeded
    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    /// Planned changes, one line each (`www/A: 198.51.100.1 -> 203.0.113.5`)
    pub fn plan_lines(&self) -> Vec<String> {
        self.changes
            .iter()
            .map(|change| {
                format!(
                    "{}/{}: {} -> {}",
                    change.name,
                    change.desired.record_type,
                    change.current_values(),
                    change.desired.values.join(",")
                )
            })
            .collect()
    }

    /// Managed records that already match (`No differences: mail, vpn`)
    pub fn unchanged_line(&self) -> Option<String> {
        if self.unchanged.is_empty() {
            return None;
        }
        Some(format!("No differences: {}", self.unchanged.join(", ")))
    }

    /// Message part of the terminal line
    pub fn message(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::Error { .. } => outcome.to_string(),
            Outcome::NoChange => self.with_ip("records up to date".to_string()),
            Outcome::Updated(names) => {
                let verb = if self.dry_run { "would update" } else { "updated" };
                let records: Vec<String> = names.iter().map(|name| self.label(name)).collect();
                self.with_ip(format!("{}: {}", verb, records.join(", ")))
            }
        }
    }

    /// `name/TYPE` when the type is known from the plan
    fn label(&self, name: &str) -> String {
        match self.changes.iter().find(|c| c.name == name) {
            Some(change) => format!("{}/{}", name, change.desired.record_type),
            None => name.to_string(),
        }
    }

    fn with_ip(&self, message: String) -> String {
        match self.ip {
            Some(ip) => format!("Local IP: {}, {}", ip, message),
            None => message,
        }
    }
}

/// Format the terminal line
pub fn log_line(timestamp: DateTime<Local>, message: &str, outcome: &Outcome) -> String {
    format!(
        "{} - {} [{}]",
        timestamp.format(TIMESTAMP_FORMAT),
        message,
        outcome.tag()
    )
}

/// Append `line` to the log file, creating it if needed
pub async fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;

    file.write_all(format!("{}\n", line).as_bytes()).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ddns_core::{DesiredRecord, RemoteRecord, Snapshot};

    fn ip() -> IpAddr {
        "203.0.113.5".parse().unwrap()
    }

    fn change(name: &str, current: Option<&str>) -> RecordChange {
        RecordChange {
            name: name.to_string(),
            current: current.map(|value| RemoteRecord {
                name: name.to_string(),
                record_type: "A".to_string(),
                ttl: 3600,
                values: vec![value.to_string()],
            }),
            desired: DesiredRecord::for_ip(name, ip(), 3600),
        }
    }

    fn report(dry_run: bool) -> RunReport {
        let mut report = RunReport::new(dry_run);
        report.observe(EngineEvent::IpResolved { ip: ip() });
        report.observe(EngineEvent::RecordUnchanged {
            name: "mail".to_string(),
        });
        report.observe(EngineEvent::RecordChanged {
            change: change("@", Some("198.51.100.1")),
        });
        report.observe(EngineEvent::RecordChanged {
            change: change("www", None),
        });
        report
    }

    #[test]
    fn test_updated_message_lists_types() {
        let outcome = Outcome::Updated(vec!["@".to_string(), "www".to_string()]);
        assert_eq!(
            report(false).message(&outcome),
            "Local IP: 203.0.113.5, updated: @/A, www/A"
        );
    }

    #[test]
    fn test_dry_run_message() {
        let report = report(true);
        let outcome = Outcome::Updated(vec!["@".to_string(), "www".to_string()]);

        assert_eq!(
            report.message(&outcome),
            "Local IP: 203.0.113.5, would update: @/A, www/A"
        );
        assert_eq!(
            report.plan_lines(),
            vec!["@/A: 198.51.100.1 -> 203.0.113.5", "www/A: - -> 203.0.113.5"]
        );
        assert_eq!(report.unchanged_line().as_deref(), Some("No differences: mail"));
    }

    #[test]
    fn test_dry_run_without_changes_lists_records() {
        let mut report = RunReport::new(true);
        report.observe(EngineEvent::IpResolved { ip: ip() });
        for name in ["@", "www"] {
            report.observe(EngineEvent::RecordUnchanged {
                name: name.to_string(),
            });
        }

        assert!(report.plan_lines().is_empty());
        assert_eq!(
            report.unchanged_line().as_deref(),
            Some("No differences: @, www")
        );
        assert_eq!(
            report.message(&Outcome::NoChange),
            "Local IP: 203.0.113.5, records up to date"
        );
    }

    #[test]
    fn test_no_change_message() {
        let mut report = RunReport::new(false);
        report.observe(EngineEvent::IpResolved { ip: ip() });

        assert_eq!(report.ip(), Some(ip()));
        assert_eq!(
            report.message(&Outcome::NoChange),
            "Local IP: 203.0.113.5, records up to date"
        );
    }

    #[test]
    fn test_error_message_keeps_snapshot() {
        let outcome = Outcome::Error {
            reason: "update failed for www".to_string(),
            cause: Some("HTTP 400".to_string()),
            snapshot: Some(Snapshot::new("snap-1")),
        };

        assert_eq!(
            report(false).message(&outcome),
            "update failed for www: HTTP 400. Backup snapshot id: snap-1"
        );
    }

    #[test]
    fn test_log_line_format() {
        let timestamp = Local.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(
            log_line(timestamp, "Local IP: 203.0.113.5, records up to date", &Outcome::NoChange),
            "2024-01-15 12:00:00 - Local IP: 203.0.113.5, records up to date [OK]"
        );
    }

    #[tokio::test]
    async fn test_append_line_creates_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ddns.log");

        append_line(&path, "first [OK]").await.unwrap();
        append_line(&path, "second [UPDATE]").await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "first [OK]\nsecond [UPDATE]\n");
    }
}

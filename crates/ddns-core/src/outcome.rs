//! Terminal result of a reconciliation run

use std::fmt;

use crate::records::Snapshot;

/// Reason reported when the public IP could not be resolved
pub const REASON_RESOLUTION: &str = "resolution failed";
/// Reason reported when the zone could not be read
pub const REASON_LIST: &str = "listing records failed";
/// Reason reported when the safety snapshot could not be created
pub const REASON_SNAPSHOT: &str = "snapshot failed";

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every managed record already matches the current IP
    NoChange,

    /// These records were updated (or would be, in dry-run mode),
    /// in configured order
    Updated(Vec<String>),

    /// The run stopped on an error
    Error {
        /// Short, stable description of the failed step
        reason: String,
        /// Underlying error text
        cause: Option<String>,
        /// Snapshot left on the provider side for manual recovery
        snapshot: Option<Snapshot>,
    },
}

impl Outcome {
    /// Build an error outcome from a failed step
    pub fn error(
        reason: impl Into<String>,
        cause: &crate::Error,
        snapshot: Option<Snapshot>,
    ) -> Self {
        Outcome::Error {
            reason: reason.into(),
            cause: Some(cause.to_string()),
            snapshot,
        }
    }

    /// Reason reported when writing `name` failed
    pub fn update_failed_reason(name: &str) -> String {
        format!("update failed for {}", name)
    }

    /// `true` for `NoChange` and `Updated`
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Error { .. })
    }

    /// Snapshot retained by a failed run, if any
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Outcome::Error { snapshot, .. } => snapshot.as_ref(),
            _ => None,
        }
    }

    /// Status tag of the terminal log line
    pub fn tag(&self) -> &'static str {
        match self {
            Outcome::NoChange => "OK",
            Outcome::Updated(_) => "UPDATE",
            Outcome::Error { .. } => "ERROR",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoChange => write!(f, "records up to date"),
            Outcome::Updated(names) => write!(f, "updated: {}", names.join(", ")),
            Outcome::Error {
                reason,
                cause,
                snapshot,
            } => {
                write!(f, "{}", reason)?;
                if let Some(cause) = cause {
                    write!(f, ": {}", cause)?;
                }
                if let Some(snapshot) = snapshot {
                    write!(f, ". Backup snapshot id: {}", snapshot)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_snapshot() {
        let outcome = Outcome::error(
            Outcome::update_failed_reason("www"),
            &crate::Error::update("HTTP 400 - bad value"),
            Some(Snapshot::new("snap-42")),
        );

        assert!(!outcome.is_success());
        assert_eq!(outcome.tag(), "ERROR");
        assert_eq!(outcome.snapshot(), Some(&Snapshot::new("snap-42")));
        assert_eq!(
            outcome.to_string(),
            "update failed for www: Record update error: HTTP 400 - bad value. Backup snapshot id: snap-42"
        );
    }

    #[test]
    fn test_success_tags() {
        assert!(Outcome::NoChange.is_success());
        assert_eq!(Outcome::NoChange.tag(), "OK");
        let updated = Outcome::Updated(vec!["@".to_string(), "www".to_string()]);
        assert!(updated.is_success());
        assert_eq!(updated.tag(), "UPDATE");
        assert_eq!(updated.snapshot(), None);
        assert_eq!(updated.to_string(), "updated: @, www");
    }
}

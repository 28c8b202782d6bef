//! What a simulated host observed, in order.

use crate::model::{Diagnostic, LifecycleEvent};
use serde::Serialize;
use std::fmt;

/// One observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    /// A lifecycle notification.
    Lifecycle(LifecycleEvent),
    /// The user dismissed the sheet.
    Dismiss,
    /// An imperative call was ignored.
    Diagnostic {
        /// Why.
        diagnostic: Diagnostic,
    },
    /// The animator came to rest.
    Rest {
        /// Height it rests at.
        height: f64,
    },
    /// The sheet terminated with a fatal error.
    Fatal {
        /// Error message.
        error: String,
    },
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Lifecycle(event) => write!(f, "{event}"),
            Record::Dismiss => f.write_str("dismiss"),
            Record::Diagnostic { diagnostic } => write!(f, "diagnostic: {diagnostic}"),
            Record::Rest { height } => write!(f, "rest at {height}"),
            Record::Fatal { error } => write!(f, "fatal: {error}"),
        }
    }
}

/// A record stamped with virtual time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Milliseconds since the simulation started.
    pub at_ms: u64,
    /// What happened.
    #[serde(flatten)]
    pub record: Record,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}ms  {}", self.at_ms, self.record)
    }
}

/// Everything a scenario run observed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    /// Scenario name.
    pub name: String,
    /// Observations in the order they happened.
    pub entries: Vec<Entry>,
}

impl Transcript {
    /// Only the lifecycle notifications.
    pub fn lifecycle(&self) -> impl Iterator<Item = &LifecycleEvent> + '_ {
        self.entries.iter().filter_map(|entry| match &entry.record {
            Record::Lifecycle(event) => Some(event),
            _ => None,
        })
    }

    /// Lifecycle notifications rendered as `"start open (custom)"` lines.
    pub fn lifecycle_lines(&self) -> Vec<String> {
        self.lifecycle().map(ToString::to_string).collect()
    }

    /// The fatal error that ended the run, if any.
    pub fn fatal(&self) -> Option<&str> {
        self.entries.iter().find_map(|entry| match &entry.record {
            Record::Fatal { error } => Some(error.as_str()),
            _ => None,
        })
    }

    /// One JSON object per entry.
    ///
    /// # Errors
    /// Serialization failure from `serde_json`.
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&serde_json::to_string(entry)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.name)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

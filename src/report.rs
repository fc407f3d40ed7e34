// src/report.rs

use std::fmt;
use std::sync::Mutex;

/// Kinds of non-fatal conditions surfaced by the controller and the screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    /// The device location collaborator refused access.
    PermissionDenied,
    /// Permission was granted but no position sample could be taken.
    LocationUnavailable,
    /// The geocoding provider answered with an empty result array.
    NoResultsFound,
    /// The geocoding request failed or its body could not be parsed.
    SearchFailed,
    /// The authentication provider rejected a request.
    AuthFailed,
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionKind::PermissionDenied => "permission denied",
            ConditionKind::LocationUnavailable => "location unavailable",
            ConditionKind::NoResultsFound => "no results found",
            ConditionKind::SearchFailed => "search failed",
            ConditionKind::AuthFailed => "authentication failed",
        };
        f.write_str(name)
    }
}

/// Single sink for every non-fatal condition.
///
/// Controllers and screens never log failures ad hoc; they call `report` and
/// carry on with their state untouched. How a report is displayed (a toast, a
/// log line, nothing at all) is up to the implementation.
pub trait Reporter: Send + Sync {
    fn report(&self, kind: ConditionKind, detail: &str);
}

/// Default reporter: writes every condition to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, kind: ConditionKind, detail: &str) {
        match kind {
            ConditionKind::SearchFailed | ConditionKind::AuthFailed => {
                log::error!("{}: {}", kind, detail)
            }
            _ => log::warn!("{}: {}", kind, detail),
        }
    }
}

/// A condition captured by [`MemoryReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub kind: ConditionKind,
    pub detail: String,
}

/// Reporter that keeps every condition in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    reports: Mutex<Vec<Report>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything reported so far.
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    /// Returns only the kinds, which is what most assertions care about.
    pub fn kinds(&self) -> Vec<ConditionKind> {
        self.reports().into_iter().map(|r| r.kind).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.clear();
        }
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, kind: ConditionKind, detail: &str) {
        log::debug!("Recording condition {:?}: {}", kind, detail);
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(Report {
                kind,
                detail: detail.to_string(),
            });
        }
    }
}

use tracing::{error, info, warn};

use crate::types::Severity;

/// Sink for row-level anomalies. Implementations must not block.
pub trait Reporter: Send + Sync {
    fn report(&self, source: &str, message: &str, severity: Severity);
}

/// Forwards every report to `tracing` at the level matching its severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, source: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Info => info!(source, "{}", message),
            Severity::Warn => warn!(source, "{}", message),
            Severity::Fail => error!(source, "{}", message),
        }
    }
}

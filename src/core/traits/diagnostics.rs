use crate::core::errors::Result;
use crate::core::models::resolution_entry::ResolutionEntry;

/// Port for recording and querying resolution outcomes.
pub trait DiagnosticsLog: Send + Sync {
    /// Append an entry to the log.
    fn record(&self, entry: &ResolutionEntry) -> Result<()>;

    /// All entries in append order, or only the failed ones.
    fn query(&self, failures_only: bool) -> Result<Vec<ResolutionEntry>>;
}

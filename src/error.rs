use thiserror::Error;

/// Hard failures that abort a rating run. Everything else in the pipeline is
/// reported through `anyhow` at the call site.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The stream is date-sorted before processing, so a season index moving
    /// backwards means the input's season labeling is corrupt, not merely
    /// unsorted. No partial recovery.
    #[error(
        "games out of order: match season {match_season} precedes current season {current_season}"
    )]
    OrderingViolation {
        match_season: i32,
        current_season: i32,
    },

    #[error("no results to process in {path}")]
    EmptyResults { path: String },
}

// Explicit "no result" outcomes for the statistics engine.
//
// None of these are fatal: each one tells the presentation layer what to show
// instead of a chart, so a missing value is never mistaken for a real score.

use thiserror::Error;

use crate::metrics::PlayerType;

#[derive(Debug, Error)]
pub enum StatsError {
    /// Nobody met the minimum-opportunity threshold, so there is no league
    /// distribution to rank against.
    #[error("no qualified {side}s to rank against")]
    NoQualifiedPlayers { side: PlayerType },

    #[error("no data for group `{group}`")]
    NoData { group: String },

    #[error("unrecognized group code `{code}`")]
    UnrecognizedGroup { code: String },

    #[error("unrecognized player type `{0}` (expected batter or pitcher)")]
    UnrecognizedPlayerType(String),

    #[error("unrecognized action `{0}` (expected retain, trade, extend or option)")]
    UnrecognizedAction(String),

    #[error("stat source error: {0:#}")]
    Source(#[from] anyhow::Error),
}

impl StatsError {
    /// True for outcomes that mean "nothing to show" rather than a failure
    /// of the store.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            StatsError::NoQualifiedPlayers { .. } | StatsError::NoData { .. }
        )
    }
}

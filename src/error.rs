//! Error types for the arena core.
//!
//! Gameplay itself never fails: degenerate vectors, empty queues and missing
//! sprites all degrade to a fallback. Errors only surface at the boundary with
//! collaborators (interstitial results, configuration, leaderboard data).

/// Main error type for the arena core.
#[derive(thiserror::Error, Debug)]
pub enum ArenaError {
    #[error("No interstitial is waiting for a result")]
    NoPendingInterstitial,

    #[error("Interstitial mismatch: expected {expected}, found {found}")]
    InterstitialMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unknown upgrade: {0}")]
    UnknownUpgrade(String),

    #[error("Upgrade was not offered: {0}")]
    UpgradeNotOffered(String),

    #[error("Session is over")]
    SessionOver,

    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ArenaError>;

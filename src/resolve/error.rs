//! Error types for tier resolution.

use thiserror::Error;

/// Failure of a single tier lookup, or of the whole chain once every tier
/// has been exhausted.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Network or HTTP-level failure reaching a tier.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A tier answered but does not contain the requested coordinate.
    #[error("no data found for {coordinate} ({detail})")]
    NotFound { coordinate: String, detail: String },

    /// A tier answered with a payload missing the expected structure.
    #[error("malformed payload from {tier}: {detail}")]
    MalformedSource { tier: &'static str, detail: String },
}

impl ResolveError {
    pub fn not_found(coordinate: impl std::fmt::Display, detail: impl Into<String>) -> Self {
        Self::NotFound {
            coordinate: coordinate.to_string(),
            detail: detail.into(),
        }
    }

    pub fn malformed(tier: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedSource {
            tier,
            detail: detail.into(),
        }
    }

    /// How diagnostic this error is when the whole chain fails. A tier that
    /// answered and reported absence beats a malformed payload, which beats
    /// a generic transport failure.
    pub fn substance(&self) -> u8 {
        match self {
            Self::Transport(_) => 0,
            Self::MalformedSource { .. } => 1,
            Self::NotFound { .. } => 2,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type ResolveResult<T> = Result<T, ResolveError>;

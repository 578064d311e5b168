// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::source::SourceError;
use crate::store::StoreError;
use metricache_domain::{AggregationError, DomainError};
use thiserror::Error;

/// Errors surfaced by the recompute coordinator.
///
/// Cloneable so that every caller waiting on a shared computation receives
/// the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The source system could not be reached.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),
    /// The source system did not answer in time.
    #[error("Source timed out after {after_ms} ms")]
    SourceTimeout {
        /// How long the caller waited.
        after_ms: u64,
    },
    /// The records could not be aggregated.
    #[error("Aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),
    /// The cache store failed.
    #[error("Cache store error: {0}")]
    Store(#[from] StoreError),
    /// The requested key is not valid.
    #[error("Invalid key: {0}")]
    InvalidKey(#[from] DomainError),
    /// The task computing a key ended without producing a result.
    #[error("Computation for {key} aborted: {reason}")]
    ComputationAborted {
        /// The key being computed.
        key: String,
        /// Runtime message.
        reason: String,
    },
}

impl CacheError {
    /// Whether retrying the same request later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable(_) | Self::SourceTimeout { .. })
    }
}

impl From<SourceError> for CacheError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unavailable(message) => Self::SourceUnavailable(message),
            SourceError::Timeout { after_ms } => Self::SourceTimeout { after_ms },
            SourceError::Malformed(reason) => {
                Self::Aggregation(AggregationError::MalformedRecord { reason })
            }
        }
    }
}

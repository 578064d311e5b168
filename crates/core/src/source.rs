// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::domains::MetricDomain;
use futures::stream::BoxStream;
use thiserror::Error;

/// Failures reported by a source adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The source could not be reached or refused the call.
    #[error("Source unavailable: {0}")]
    Unavailable(String),
    /// A chunk did not arrive in time.
    #[error("Source timed out after {after_ms} ms")]
    Timeout {
        /// How long the caller waited.
        after_ms: u64,
    },
    /// A record could not be decoded.
    #[error("Malformed source record: {0}")]
    Malformed(String),
}

/// A lazily fetched sequence of record chunks.
pub type RecordChunks<'a, R> = BoxStream<'a, Result<Vec<R>, SourceError>>;

/// Read access to the external system holding the raw records of a domain.
///
/// `fetch` must return every record relevant to `key` exactly once across
/// the chunks of a single call, in chunks of at most `chunk_size` records.
/// A call is not resumable: after a failure the caller starts over with a
/// new call.
pub trait SourceAdapter<D: MetricDomain>: Send + Sync {
    /// Streams the records for `key`.
    fn fetch(&self, key: &D::Key, chunk_size: usize) -> RecordChunks<'_, D::Record>;
}

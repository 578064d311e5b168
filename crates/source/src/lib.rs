// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Source adapters for the metric cache.
//!
//! [`MemorySource`] serves records page by page with offset and limit, the
//! way an ERP `search_read` endpoint does, and can be loaded from JSON
//! fixtures. [`WithTimeout`] bounds the wait for each page of any adapter.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod fixtures;
mod memory;
mod scope;
mod timeout;

#[cfg(test)]
mod tests;

pub use fixtures::{FixtureError, FixtureSources, RecordFixtures};
pub use memory::MemorySource;
pub use scope::InScope;
pub use timeout::WithTimeout;

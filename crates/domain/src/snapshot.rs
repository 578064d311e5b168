// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::metrics::MetricComponents;
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

/// The persisted result of one aggregation for one key.
///
/// The headline is derived from the components at construction and cannot
/// be set independently, so the two never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSnapshot<K, C> {
    key: K,
    components: C,
    headline: Option<Decimal>,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

impl<K, C: MetricComponents> MetricSnapshot<K, C> {
    /// Creates a snapshot, deriving its headline from `components`.
    #[must_use]
    pub fn new(key: K, components: C, updated_at: OffsetDateTime) -> Self {
        let headline = components.headline();
        Self {
            key,
            components,
            headline,
            updated_at,
        }
    }
}

impl<K, C> MetricSnapshot<K, C> {
    /// Returns the key this snapshot belongs to.
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Returns the component values.
    #[must_use]
    pub const fn components(&self) -> &C {
        &self.components
    }

    /// Returns the derived headline value, if the domain has one.
    #[must_use]
    pub const fn headline(&self) -> Option<Decimal> {
        self.headline
    }

    /// Returns when the snapshot was last written.
    #[must_use]
    pub const fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}

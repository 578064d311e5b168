// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{invoice, period};
use crate::{MemorySource, WithTimeout};
use futures::TryStreamExt;
use metricache::{InvoicedTotals, SourceAdapter, SourceError};
use metricache_domain::InvoiceRecord;
use std::time::Duration;
use time::macros::date;

#[tokio::test]
async fn test_slow_page_becomes_timeout() {
    let slow = MemorySource::new(vec![invoice(1, date!(2025 - 03 - 10))])
        .with_latency(Duration::from_millis(200));
    let source = WithTimeout::new(slow, Duration::from_millis(20));

    let result: Result<Vec<Vec<InvoiceRecord>>, SourceError> =
        SourceAdapter::<InvoicedTotals>::fetch(&source, &period(2025, 3), 10)
            .try_collect()
            .await;

    assert_eq!(result, Err(SourceError::Timeout { after_ms: 20 }));
}

#[tokio::test]
async fn test_fast_pages_pass_through() {
    let fast = MemorySource::new(vec![
        invoice(1, date!(2025 - 03 - 10)),
        invoice(2, date!(2025 - 03 - 11)),
        invoice(3, date!(2025 - 03 - 12)),
    ]);
    let source = WithTimeout::new(fast, Duration::from_secs(5));

    let pages: Vec<Vec<InvoiceRecord>> =
        SourceAdapter::<InvoicedTotals>::fetch(&source, &period(2025, 3), 2)
            .try_collect()
            .await
            .unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(source.inner().pages(), 2);
    assert_eq!(source.limit(), Duration::from_secs(5));
}

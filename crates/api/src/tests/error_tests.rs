// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ApiError, translate_cache_error, translate_persistence_error};
use metricache::{CacheError, StoreError};
use metricache_domain::{AggregationError, DomainError};
use metricache_persistence::PersistenceError;

#[test]
fn test_source_errors_translate_to_retryable_failures() {
    for err in [
        CacheError::SourceUnavailable(String::from("refused")),
        CacheError::SourceTimeout { after_ms: 500 },
    ] {
        let translated = translate_cache_error(err);
        assert!(translated.is_retryable(), "{translated}");
    }
}

#[test]
fn test_invalid_key_translates_to_invalid_input() {
    let translated = translate_cache_error(CacheError::InvalidKey(DomainError::InvalidMonth {
        month: 13,
    }));
    assert_eq!(
        translated,
        ApiError::InvalidInput {
            field: String::from("month"),
            message: String::from("Invalid month 13: must be between 1 and 12"),
        }
    );
}

#[test]
fn test_aggregation_error_is_not_retryable() {
    let translated = translate_cache_error(CacheError::Aggregation(
        AggregationError::NegativeAmount {
            record_id: 4,
            value: String::from("-1.00"),
        },
    ));
    assert!(matches!(translated, ApiError::AggregationFailed { .. }));
    assert!(!translated.is_retryable());
}

#[test]
fn test_store_and_aborted_errors_are_internal() {
    let store = translate_cache_error(CacheError::Store(StoreError::Write(String::from(
        "disk full",
    ))));
    assert!(matches!(store, ApiError::Internal { .. }));

    let aborted = translate_cache_error(CacheError::ComputationAborted {
        key: String::from("2025-03"),
        reason: String::from("panicked"),
    });
    assert!(matches!(aborted, ApiError::Internal { .. }));
}

#[test]
fn test_invalid_settings_translate_to_invalid_input() {
    let translated = translate_persistence_error(PersistenceError::InvalidSettings(
        String::from("refresh_concurrency must be between 1 and 2147483647"),
    ));
    assert!(matches!(
        translated,
        ApiError::InvalidInput { ref field, .. } if field == "settings"
    ));

    let other = translate_persistence_error(PersistenceError::SettingsMissing);
    assert!(matches!(other, ApiError::Internal { .. }));
}

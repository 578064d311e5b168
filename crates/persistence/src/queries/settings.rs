// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::data_models::CacheSettingsRow;
use crate::diesel_schema::cache_settings;
use crate::error::PersistenceError;

/// The fixed id of the single settings row.
pub const SETTINGS_ID: i32 = 1;

/// Fetches the settings row.
///
/// # Errors
///
/// Returns an error if the query fails or the row does not exist.
pub fn get_settings(conn: &mut SqliteConnection) -> Result<CacheSettingsRow, PersistenceError> {
    cache_settings::table
        .filter(cache_settings::settings_id.eq(SETTINGS_ID))
        .select(CacheSettingsRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_settings: {e}")))?
        .ok_or(PersistenceError::SettingsMissing)
}

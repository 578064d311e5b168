// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::info;

use crate::data_models::CacheSettingsChanges;
use crate::diesel_schema::cache_settings;
use crate::error::PersistenceError;
use crate::queries::settings::SETTINGS_ID;

/// Overwrites the settings row.
///
/// # Errors
///
/// Returns an error if the write fails or the row does not exist.
pub fn update_settings(
    conn: &mut SqliteConnection,
    changes: &CacheSettingsChanges,
) -> Result<(), PersistenceError> {
    let updated: usize =
        diesel::update(cache_settings::table.filter(cache_settings::settings_id.eq(SETTINGS_ID)))
            .set(changes)
            .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::SettingsMissing);
    }
    info!("Cache settings updated");
    Ok(())
}

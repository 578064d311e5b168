// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command execution against one database and one fixture source.

use crate::cli::{Command, SettingsAction};
use metricache::Clock;
use metricache_api::{
    ApiError, EngineConfig, GetMetricRequest, GetSeriesRequest, MetricService, MetricSources,
    MetricStores, RefreshAllRequest,
};
use metricache_domain::PeriodRange;
use metricache_persistence::{Persistence, PersistenceError, SqliteCacheStore};
use metricache_source::{FixtureError, RecordFixtures};
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Fixtures(#[from] FixtureError),
    #[error("Failed to render output: {0}")]
    Json(#[from] serde_json::Error),
}

/// A wired service together with the database it writes to.
pub struct Session {
    service: MetricService,
    store: SqliteCacheStore,
    employee_ids: Vec<i64>,
}

impl Session {
    /// Opens the database and loads the fixtures.
    ///
    /// # Errors
    ///
    /// Returns an error if either cannot be loaded or the stored settings
    /// are invalid.
    pub fn open(database: Option<&Path>, fixtures: Option<&Path>) -> Result<Self, CliError> {
        let persistence = match database {
            Some(path) => Persistence::new_with_file(path)?,
            None => {
                info!("Using in-memory database");
                Persistence::new_in_memory()?
            }
        };
        let fixtures = match fixtures {
            Some(path) => RecordFixtures::from_path(path)?,
            None => RecordFixtures::default(),
        };
        Self::build(persistence, fixtures, None)
    }

    /// Wires a session, using `clock` instead of the configured wall clock
    /// when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored settings are invalid.
    pub fn build(
        mut persistence: Persistence,
        fixtures: RecordFixtures,
        clock: Option<Arc<dyn Clock>>,
    ) -> Result<Self, CliError> {
        let config = EngineConfig::from_settings(&persistence.get_settings()?);
        let clock: Arc<dyn Clock> = match clock {
            Some(clock) => clock,
            None => Arc::new(config.clock()?),
        };
        let employee_ids = fixtures.employee_ids();
        let sources = fixtures.into_sources();
        let store = SqliteCacheStore::new(persistence, Arc::clone(&clock));
        let service = MetricService::new(
            config,
            MetricSources {
                invoices: sources.invoices,
                hours: sources.hours,
                sales_orders: sources.sales_orders,
                capacity: sources.capacity,
            },
            MetricStores::sqlite(&store),
            clock,
        );
        Ok(Self {
            service,
            store,
            employee_ids,
        })
    }
}

/// Runs `command` and returns its JSON output.
///
/// # Errors
///
/// Returns an error if the command fails.
pub async fn execute(session: &Session, command: &Command) -> Result<Value, CliError> {
    match command {
        Command::Get {
            kind,
            period,
            entity,
            force,
        } => {
            let view = session
                .service
                .get_metric(&GetMetricRequest {
                    kind: *kind,
                    period: *period,
                    entity_id: *entity,
                    force_refresh: *force,
                })
                .await?;
            Ok(serde_json::to_value(view)?)
        }
        Command::Series {
            kind,
            start,
            end,
            entity,
            order,
        } => {
            let view = session
                .service
                .get_series(&GetSeriesRequest {
                    kind: *kind,
                    range: PeriodRange::new(*start, *end).map_err(ApiError::from)?,
                    entity_id: *entity,
                    order: *order,
                })
                .await?;
            Ok(serde_json::to_value(view)?)
        }
        Command::Refresh {
            start,
            end,
            kind,
            entities,
            no_force,
        } => {
            let range = PeriodRange::new(*start, *end).map_err(ApiError::from)?;
            let entity_ids = if entities.is_empty() {
                session.employee_ids.clone()
            } else {
                entities.clone()
            };
            let force_refresh = !no_force;
            match kind {
                Some(kind) => {
                    let view = session
                        .service
                        .refresh_all(&RefreshAllRequest {
                            kind: *kind,
                            range,
                            entity_ids: if kind.is_per_entity() {
                                entity_ids
                            } else {
                                Vec::new()
                            },
                            force_refresh,
                        })
                        .await?;
                    Ok(serde_json::to_value(view)?)
                }
                None => {
                    let views = session
                        .service
                        .refresh_everything(range, &entity_ids, force_refresh)
                        .await;
                    Ok(serde_json::to_value(views)?)
                }
            }
        }
        Command::Purge { kind, period } => {
            let persistence = session.store.persistence();
            let deleted = persistence.lock().await.delete_snapshots(*kind, *period)?;
            Ok(json!({ "kind": kind, "period": period, "deleted": deleted }))
        }
        Command::Settings { action } => {
            let persistence = session.store.persistence();
            let mut persistence = persistence.lock().await;
            match action {
                SettingsAction::Show => Ok(serde_json::to_value(persistence.get_settings()?)?),
                SettingsAction::Set(changes) => {
                    let mut settings = persistence.get_settings()?;
                    changes.apply(&mut settings);
                    let now = session.service.invoiced().clock().now();
                    let stored = persistence.update_settings(&settings, now)?;
                    info!("Settings updated");
                    Ok(serde_json::to_value(stored)?)
                }
            }
        }
    }
}

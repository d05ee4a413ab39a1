//! PostgreSQL implementation of [`SettingsRepository`].

use crate::connection::{PgPool, run_blocking};
use crate::models::SettingsRow;
use crate::schema::app_settings;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use storybook_core::SharedSettings;
use storybook_error::StorybookResult;
use storybook_interface::SettingsRepository;
use tracing::{debug, instrument};

/// Primary key of the single settings row.
pub const GLOBAL_SETTINGS_ID: &str = "global";

/// Shared settings record stored as one row keyed by [`GLOBAL_SETTINGS_ID`].
#[derive(Debug, Clone)]
pub struct PostgresSettingsRepository {
    pool: PgPool,
}

impl PostgresSettingsRepository {
    /// Create a repository over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PostgresSettingsRepository {
    #[instrument(skip(self))]
    async fn load_shared(&self) -> StorybookResult<Option<SharedSettings>> {
        let row = run_blocking(&self.pool, |conn| {
            Ok(app_settings::table
                .find(GLOBAL_SETTINGS_ID)
                .select(SettingsRow::as_select())
                .first(conn)
                .optional()?)
        })
        .await?;
        Ok(row.map(SharedSettings::from))
    }

    #[instrument(skip(self, settings), fields(engine = %settings.image_engine))]
    async fn save_shared(&self, settings: &SharedSettings) -> StorybookResult<()> {
        let row = SettingsRow::from_shared(GLOBAL_SETTINGS_ID, settings, Utc::now());
        run_blocking(&self.pool, move |conn| {
            diesel::insert_into(app_settings::table)
                .values(&row)
                .on_conflict(app_settings::id)
                .do_update()
                .set(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;
        debug!("Shared settings saved");
        Ok(())
    }
}

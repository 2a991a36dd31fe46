use super::DbClient;
use crate::db::models::Setting;
use crate::Result;
use chrono::Utc;
use diesel::{expression_methods::ExpressionMethods, query_dsl::QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use futures::future::try_join_all;
use serde_json::{Map, Value};
use tracing::info;

impl DbClient {
    /// All settings sections as one `key -> value` object
    pub async fn get_settings(&self) -> Result<Map<String, Value>> {
        use crate::schema::settings::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        let rows = settings
            .order(key.asc())
            .select(Setting::as_select())
            .load::<Setting>(conn)
            .await?;

        Ok(rows.into_iter().map(|s| (s.key, s.value)).collect())
    }

    pub async fn upsert_setting(&self, setting_key: &str, setting_value: &Value) -> Result<usize> {
        use crate::schema::settings::dsl::*;

        let row = Setting {
            key: setting_key.to_string(),
            value: setting_value.clone(),
            updated_at: Utc::now(),
        };

        let conn = &mut self.get_db_conn().await?;
        diesel::insert_into(settings)
            .values(&row)
            .on_conflict(key)
            .do_update()
            .set((value.eq(&row.value), updated_at.eq(row.updated_at)))
            .execute(conn)
            .await
            .map_err(Into::into)
    }

    /// Upserts every section concurrently; any failure fails the save
    pub async fn save_settings(&self, sections: &Map<String, Value>) -> Result<usize> {
        let saved = try_join_all(
            sections
                .iter()
                .map(|(section, section_value)| self.upsert_setting(section, section_value)),
        )
        .await?;

        info!("Saved {} settings sections", saved.len());
        Ok(saved.len())
    }
}

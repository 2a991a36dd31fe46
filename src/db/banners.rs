use super::DbClient;
use crate::db::models::{Banner, CreateBannerParams, NewBanner};
use crate::Result;
use diesel::{expression_methods::ExpressionMethods, query_dsl::QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use tracing::info;
use uuid::Uuid;

const DEFAULT_TARGET_TYPE: &str = "none";

impl From<CreateBannerParams> for NewBanner {
    /// New banners are active immediately
    fn from(params: CreateBannerParams) -> Self {
        NewBanner {
            title: params.title,
            image_url: params.image_url,
            target_type: params
                .target_type
                .unwrap_or_else(|| DEFAULT_TARGET_TYPE.to_string()),
            target_value: params.target_value.filter(|v| !v.trim().is_empty()),
            display_order: params.display_order.unwrap_or(0),
            is_active: true,
        }
    }
}

impl DbClient {
    pub async fn list_banners(&self) -> Result<Vec<Banner>> {
        use crate::schema::app_banners::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        app_banners
            .order(display_order.asc())
            .select(Banner::as_select())
            .load::<Banner>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn create_banner(&self, banner: &NewBanner) -> Result<Banner> {
        use crate::schema::app_banners::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        let created = diesel::insert_into(app_banners)
            .values(banner)
            .returning(Banner::as_returning())
            .get_result::<Banner>(conn)
            .await?;
        info!("Created banner {} at position {}", created.id, created.display_order);
        Ok(created)
    }

    /// Flips `is_active` and returns the updated banner
    pub async fn toggle_banner(&self, banner_id: Uuid) -> Result<Banner> {
        use crate::schema::app_banners::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        diesel::update(app_banners.filter(id.eq(banner_id)))
            .set(is_active.eq(diesel::dsl::not(is_active)))
            .returning(Banner::as_returning())
            .get_result::<Banner>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_banner(&self, banner_id: Uuid) -> Result<usize> {
        use crate::schema::app_banners::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        diesel::delete(app_banners.filter(id.eq(banner_id)))
            .execute(conn)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_banner_defaults() {
        let banner = NewBanner::from(CreateBannerParams {
            title: "Mock test week".to_string(),
            image_url: "https://cdn.sscexamhub.in/mock-week.png".to_string(),
            target_type: None,
            target_value: Some("  ".to_string()),
            display_order: None,
        });

        assert_eq!(banner.target_type, "none");
        assert_eq!(banner.target_value, None);
        assert_eq!(banner.display_order, 0);
        assert!(banner.is_active);
    }
}

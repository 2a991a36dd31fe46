use super::DbClient;
use crate::db::models::{NewNotification, Notification, SendNotificationParams};
use crate::Result;
use diesel::{expression_methods::ExpressionMethods, query_dsl::QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use tracing::info;
use uuid::Uuid;

/// The notifications screen only shows the latest sends
pub const RECENT_NOTIFICATIONS: i64 = 20;

const DEFAULT_NOTIFICATION_TYPE: &str = "info";
const DEFAULT_AUDIENCE: &str = "all";

impl From<SendNotificationParams> for NewNotification {
    fn from(params: SendNotificationParams) -> Self {
        NewNotification {
            title: params.title,
            message: params.message,
            notification_type: params
                .notification_type
                .unwrap_or_else(|| DEFAULT_NOTIFICATION_TYPE.to_string()),
            target_audience: params
                .target_audience
                .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
        }
    }
}

impl DbClient {
    pub async fn list_notifications(&self) -> Result<Vec<Notification>> {
        use crate::schema::app_notifications::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        app_notifications
            .order(created_at.desc())
            .limit(RECENT_NOTIFICATIONS)
            .select(Notification::as_select())
            .load::<Notification>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn send_notification(&self, notification: &NewNotification) -> Result<Notification> {
        use crate::schema::app_notifications::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        let sent = diesel::insert_into(app_notifications)
            .values(notification)
            .returning(Notification::as_returning())
            .get_result::<Notification>(conn)
            .await?;
        info!(
            "Queued {} notification {} for audience {}",
            sent.notification_type, sent.id, sent.target_audience
        );
        Ok(sent)
    }

    pub async fn delete_notification(&self, notification_id: Uuid) -> Result<usize> {
        use crate::schema::app_notifications::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        diesel::delete(app_notifications.filter(id.eq(notification_id)))
            .execute(conn)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_defaults() {
        let notification = NewNotification::from(SendNotificationParams {
            title: "Results out".to_string(),
            message: "CGL Tier 1 answer key is live".to_string(),
            notification_type: None,
            target_audience: None,
        });
        assert_eq!(notification.notification_type, "info");
        assert_eq!(notification.target_audience, "all");

        let notification = NewNotification::from(SendNotificationParams {
            title: "Sale".to_string(),
            message: "50% off Pro".to_string(),
            notification_type: Some("promo".to_string()),
            target_audience: Some("free".to_string()),
        });
        assert_eq!(notification.notification_type, "promo");
        assert_eq!(notification.target_audience, "free");
    }
}

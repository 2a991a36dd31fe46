use super::{search_pattern, DbClient};
use crate::db::models::{NewsItem, Page, SearchPageParams};
use crate::schema::news;
use crate::Result;
use diesel::pg::Pg;
use diesel::{
    expression_methods::{ExpressionMethods, PgSortExpressionMethods, PgTextExpressionMethods},
    query_dsl::QueryDsl,
    SelectableHelper,
};
use diesel_async::RunQueryDsl;
use tracing::info;
use uuid::Uuid;

pub const NEWS_PAGE_SIZE: i64 = 20;

fn filtered_news<'a>(params: &'a SearchPageParams) -> news::BoxedQuery<'a, Pg> {
    use crate::schema::news::dsl::*;

    let mut query = news.into_boxed();
    if let Some(pattern) = search_pattern(params.search.as_deref()) {
        query = query.filter(title.ilike(pattern));
    }
    query
}

impl DbClient {
    pub async fn list_news(&self, params: &SearchPageParams) -> Result<Page<NewsItem>> {
        use crate::schema::news::dsl::*;

        let page = params.page_params().resolve(NEWS_PAGE_SIZE);
        let conn = &mut self.get_db_conn().await?;

        let total = filtered_news(params).count().get_result::<i64>(conn).await?;
        let items = filtered_news(params)
            .order(pub_date.desc().nulls_last())
            .then_order_by(created_at.desc())
            .limit(page.page_size)
            .offset(page.offset())
            .select(NewsItem::as_select())
            .load::<NewsItem>(conn)
            .await?;

        Ok(Page {
            items,
            page: page.page,
            page_size: page.page_size,
            total,
            total_pages: page.total_pages(total),
        })
    }

    pub async fn delete_news(&self, ids: &[Uuid]) -> Result<usize> {
        use crate::schema::news::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        let deleted = diesel::delete(news.filter(id.eq_any(ids)))
            .execute(conn)
            .await?;
        info!("Deleted {} news items", deleted);
        Ok(deleted)
    }
}

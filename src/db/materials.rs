use super::{filter_value, search_pattern, DbClient};
use crate::db::models::{
    Material, MaterialChangeset, MaterialListParams, NewMaterial, SortOrder,
};
use crate::errors::ApiError;
use crate::schema::content;
use crate::Result;
use diesel::pg::Pg;
use diesel::{
    expression_methods::{BoolExpressionMethods, ExpressionMethods, PgTextExpressionMethods},
    query_dsl::QueryDsl,
    SelectableHelper,
};
use diesel_async::RunQueryDsl;
use tracing::{error, info};
use uuid::Uuid;

/// Columns the materials list may be sorted by
pub const MATERIAL_SORT_COLUMNS: [&str; 5] = ["created_at", "title", "type", "language", "file_size"];

fn sorted<'a>(
    query: content::BoxedQuery<'a, Pg>,
    column: &str,
    order: SortOrder,
) -> Result<content::BoxedQuery<'a, Pg>> {
    use crate::schema::content::dsl::*;

    let query = match (column, order) {
        ("created_at", SortOrder::Asc) => query.order(created_at.asc()),
        ("created_at", SortOrder::Desc) => query.order(created_at.desc()),
        ("title", SortOrder::Asc) => query.order(title.asc()),
        ("title", SortOrder::Desc) => query.order(title.desc()),
        ("type", SortOrder::Asc) => query.order(content_type.asc()),
        ("type", SortOrder::Desc) => query.order(content_type.desc()),
        ("language", SortOrder::Asc) => query.order(language.asc()),
        ("language", SortOrder::Desc) => query.order(language.desc()),
        ("file_size", SortOrder::Asc) => query.order(file_size.asc()),
        ("file_size", SortOrder::Desc) => query.order(file_size.desc()),
        (other, _) => {
            return Err(ApiError::Validation(format!(
                "Cannot sort materials by '{other}'"
            )))
        }
    };
    Ok(query)
}

/// DbClient helper functions for study materials (the `content` table)
impl DbClient {
    pub async fn list_materials(&self, params: &MaterialListParams) -> Result<Vec<Material>> {
        use crate::schema::content::dsl::*;

        let mut query = content.into_boxed();

        if let Some(kind) = filter_value(params.content_type.as_deref()) {
            query = query.filter(content_type.eq(kind));
        }

        if let Some(pattern) = search_pattern(params.search.as_deref()) {
            query = query.filter(title.ilike(pattern.clone()).or(title_hi.ilike(pattern)));
        }

        let column = params.sort.as_deref().unwrap_or("created_at");
        let query = sorted(query, column, params.order.unwrap_or_default())?;

        let conn = &mut self.get_db_conn().await?;
        query
            .select(Material::as_select())
            .load::<Material>(conn)
            .await
            .map_err(|e| {
                error!("Failed to fetch materials: {}", e);
                e.into()
            })
    }

    pub async fn create_material(&self, material: &NewMaterial) -> Result<Material> {
        let conn = &mut self.get_db_conn().await?;
        let created = diesel::insert_into(content::table)
            .values(material)
            .returning(Material::as_returning())
            .get_result::<Material>(conn)
            .await?;

        info!("Created {} material {}", created.content_type, created.id);
        Ok(created)
    }

    pub async fn update_material(
        &self,
        material_id: Uuid,
        changes: &MaterialChangeset,
    ) -> Result<Material> {
        use crate::schema::content::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        diesel::update(content.filter(id.eq(material_id)))
            .set(changes)
            .returning(Material::as_returning())
            .get_result::<Material>(conn)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_material(&self, material_id: Uuid) -> Result<usize> {
        use crate::schema::content::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        diesel::delete(content.filter(id.eq(material_id)))
            .execute(conn)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_whitelisted_column_sorts() {
        for column in MATERIAL_SORT_COLUMNS {
            for order in [SortOrder::Asc, SortOrder::Desc] {
                assert!(sorted(content::table.into_boxed(), column, order).is_ok());
            }
        }
    }

    #[test]
    fn test_unknown_sort_column_rejected() {
        let result = sorted(content::table.into_boxed(), "content_text; drop table", SortOrder::Asc);
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}

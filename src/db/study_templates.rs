use super::{search_pattern, DbClient};
use crate::db::models::{
    CreateTemplateParams, NewStudyTemplate, SortOrder, StudyTemplate, TemplateChangeset,
    TemplateListParams, UpdateTemplateParams,
};
use crate::errors::ApiError;
use crate::schema::study_templates;
use crate::Result;
use diesel::pg::Pg;
use diesel::{
    expression_methods::{ExpressionMethods, PgTextExpressionMethods},
    query_dsl::QueryDsl,
    SelectableHelper,
};
use diesel_async::RunQueryDsl;
use tracing::{error, info};
use uuid::Uuid;

/// Columns the template list may be sorted by
pub const TEMPLATE_SORT_COLUMNS: [&str; 2] = ["created_at", "title"];

impl TryFrom<CreateTemplateParams> for NewStudyTemplate {
    type Error = serde_json::Error;

    fn try_from(params: CreateTemplateParams) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            title: params.title.trim().to_string(),
            description: params.description.filter(|d| !d.trim().is_empty()),
            tasks: serde_json::to_value(&params.tasks)?,
            is_active: params.is_active.unwrap_or(true),
        })
    }
}

impl TryFrom<UpdateTemplateParams> for TemplateChangeset {
    type Error = serde_json::Error;

    fn try_from(params: UpdateTemplateParams) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            title: params.title.map(|t| t.trim().to_string()),
            description: params.description,
            tasks: params.tasks.as_ref().map(serde_json::to_value).transpose()?,
            is_active: params.is_active,
        })
    }
}

fn sorted<'a>(
    query: study_templates::BoxedQuery<'a, Pg>,
    column: &str,
    order: SortOrder,
) -> Result<study_templates::BoxedQuery<'a, Pg>> {
    use crate::schema::study_templates::dsl::*;

    let query = match (column, order) {
        ("created_at", SortOrder::Asc) => query.order(created_at.asc()),
        ("created_at", SortOrder::Desc) => query.order(created_at.desc()),
        ("title", SortOrder::Asc) => query.order(title.asc()),
        ("title", SortOrder::Desc) => query.order(title.desc()),
        (other, _) => {
            return Err(ApiError::Validation(format!(
                "Cannot sort templates by '{other}'"
            )))
        }
    };
    Ok(query)
}

/// DbClient helper functions for study plan templates
impl DbClient {
    pub async fn list_templates(&self, params: &TemplateListParams) -> Result<Vec<StudyTemplate>> {
        use crate::schema::study_templates::dsl::*;

        let mut query = study_templates.into_boxed();

        if let Some(pattern) = search_pattern(params.search.as_deref()) {
            query = query.filter(title.ilike(pattern));
        }

        let column = params.sort.as_deref().unwrap_or("created_at");
        let query = sorted(query, column, params.order.unwrap_or_default())?;

        let conn = &mut self.get_db_conn().await?;
        query
            .select(StudyTemplate::as_select())
            .load::<StudyTemplate>(conn)
            .await
            .map_err(|e| {
                error!("Failed to fetch study templates: {}", e);
                e.into()
            })
    }

    pub async fn create_template(&self, template: &NewStudyTemplate) -> Result<StudyTemplate> {
        let conn = &mut self.get_db_conn().await?;
        let created = diesel::insert_into(study_templates::table)
            .values(template)
            .returning(StudyTemplate::as_returning())
            .get_result::<StudyTemplate>(conn)
            .await?;

        info!("Created study template {}", created.id);
        Ok(created)
    }

    pub async fn update_template(
        &self,
        template_id: Uuid,
        changes: &TemplateChangeset,
    ) -> Result<StudyTemplate> {
        use crate::schema::study_templates::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        diesel::update(study_templates.filter(id.eq(template_id)))
            .set(changes)
            .returning(StudyTemplate::as_returning())
            .get_result::<StudyTemplate>(conn)
            .await
            .map_err(Into::into)
    }

    /// Inserts a "(Copy)" of an existing template with the same tasks
    pub async fn duplicate_template(&self, template_id: Uuid) -> Result<StudyTemplate> {
        use crate::schema::study_templates::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        let original = study_templates
            .filter(id.eq(template_id))
            .select(StudyTemplate::as_select())
            .first::<StudyTemplate>(conn)
            .await?;

        let copy = diesel::insert_into(study_templates)
            .values(&NewStudyTemplate::copy_of(&original))
            .returning(StudyTemplate::as_returning())
            .get_result::<StudyTemplate>(conn)
            .await?;

        info!("Duplicated study template {} as {}", template_id, copy.id);
        Ok(copy)
    }

    pub async fn delete_template(&self, template_id: Uuid) -> Result<usize> {
        use crate::schema::study_templates::dsl::*;

        let conn = &mut self.get_db_conn().await?;
        diesel::delete(study_templates.filter(id.eq(template_id)))
            .execute(conn)
            .await
            .map_err(Into::into)
    }
}

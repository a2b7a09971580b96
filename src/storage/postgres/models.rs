use super::{
    count_to_total, map_db_error, push_condition, push_order, push_page, row_to_model,
    MODEL_COLUMNS,
};
use crate::domain::query::like_pattern;
use crate::domain::{CarModel, CarModelPayload, DomainResult, ModelListQuery, Page};
use crate::storage::ModelRepository;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

const ENTITY: &str = "Model";

pub struct PgModelRepository {
    pool: PgPool,
}

impl PgModelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        predicate: &str,
        bind: ModelKey<'_>,
    ) -> DomainResult<Option<CarModel>> {
        let sql = format!(
            "SELECT {} FROM models m JOIN brands b ON b.id = m.brand_id WHERE {}",
            MODEL_COLUMNS, predicate
        );
        let query = sqlx::query(&sql);
        let query = match bind {
            ModelKey::Id(id) => query.bind(id),
            ModelKey::Name(name) => query.bind(name),
        };
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        row.as_ref()
            .map(row_to_model)
            .transpose()
            .map_err(|e| map_db_error(e, ENTITY))
    }
}

enum ModelKey<'a> {
    Id(i32),
    Name(&'a str),
}

fn push_model_filters(qb: &mut QueryBuilder<'static, Postgres>, query: &ModelListQuery) {
    let mut has_where = false;
    if let Some(search) = &query.search {
        push_condition(qb, &mut has_where);
        qb.push("m.name ILIKE ").push_bind(like_pattern(search));
    }
    if let Some(brand_id) = query.brand_id {
        push_condition(qb, &mut has_where);
        qb.push("m.brand_id = ").push_bind(brand_id);
    }
}

const MODEL_FROM: &str = " FROM models m JOIN brands b ON b.id = m.brand_id";

pub(crate) fn model_page_query(query: &ModelListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {}{}", MODEL_COLUMNS, MODEL_FROM));
    push_model_filters(&mut qb, query);
    push_order(&mut qb, query.sort_by.column(), query.order, "m.id");
    push_page(&mut qb, query.page.limit, query.page.offset());
    qb
}

pub(crate) fn model_count_query(query: &ModelListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*){}", MODEL_FROM));
    push_model_filters(&mut qb, query);
    qb
}

#[async_trait]
impl ModelRepository for PgModelRepository {
    async fn insert(&self, payload: &CarModelPayload) -> DomainResult<CarModel> {
        let sql = format!(
            "WITH m AS (
                INSERT INTO models (name, brand_id, fipe_value) VALUES ($1, $2, $3) RETURNING *
             )
             SELECT {} FROM m JOIN brands b ON b.id = m.brand_id",
            MODEL_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&payload.name)
            .bind(payload.brand_id)
            .bind(payload.fipe_value)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        row_to_model(&row).map_err(|e| map_db_error(e, ENTITY))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<CarModel>> {
        self.fetch_one_where("m.id = $1", ModelKey::Id(id)).await
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<CarModel>> {
        self.fetch_one_where("m.name = $1", ModelKey::Name(name)).await
    }

    async fn list(&self, query: &ModelListQuery) -> DomainResult<Page<CarModel>> {
        let rows = model_page_query(query)
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        let total = model_count_query(query)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;

        let items = rows
            .iter()
            .map(row_to_model)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_db_error(e, ENTITY))?;
        Ok(Page::new(items, query.page, count_to_total(total)))
    }

    async fn update(&self, id: i32, payload: &CarModelPayload) -> DomainResult<Option<CarModel>> {
        let sql = format!(
            "WITH m AS (
                UPDATE models SET name = $1, brand_id = $2, fipe_value = $3
                WHERE id = $4 RETURNING *
             )
             SELECT {} FROM m JOIN brands b ON b.id = m.brand_id",
            MODEL_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&payload.name)
            .bind(payload.brand_id)
            .bind(payload.fipe_value)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        row.as_ref()
            .map(row_to_model)
            .transpose()
            .map_err(|e| map_db_error(e, ENTITY))
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM models WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ModelSortField, PageRequest, SortOrder};

    #[test]
    fn page_query_combines_search_and_brand() {
        let query = ModelListQuery {
            search: Some("gol".into()),
            brand_id: Some(3),
            sort_by: ModelSortField::FipeValue,
            order: SortOrder::Asc,
            page: PageRequest { page: 1, limit: 10 },
        };
        let qb = model_page_query(&query);
        assert!(qb
            .sql()
            .ends_with(" WHERE m.name ILIKE $1 AND m.brand_id = $2 ORDER BY m.fipe_value ASC, m.id ASC LIMIT $3 OFFSET $4"));
        assert_eq!(
            model_count_query(&query).sql(),
            "SELECT COUNT(*) FROM models m JOIN brands b ON b.id = m.brand_id \
             WHERE m.name ILIKE $1 AND m.brand_id = $2"
        );
    }
}

use super::{
    count_to_total, map_db_error, push_condition, push_order, push_page, row_to_brand,
};
use crate::domain::query::like_pattern;
use crate::domain::{Brand, BrandListQuery, BrandPayload, DomainResult, Page};
use crate::storage::BrandRepository;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

const ENTITY: &str = "Brand";

pub struct PgBrandRepository {
    pool: PgPool,
}

impl PgBrandRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_brand_filters(qb: &mut QueryBuilder<'static, Postgres>, query: &BrandListQuery) {
    let mut has_where = false;
    if let Some(search) = &query.search {
        push_condition(qb, &mut has_where);
        qb.push("b.name ILIKE ").push_bind(like_pattern(search));
    }
}

pub(crate) fn brand_page_query(query: &BrandListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT b.id, b.name FROM brands b");
    push_brand_filters(&mut qb, query);
    push_order(&mut qb, query.sort_by.column(), query.order, "b.id");
    push_page(&mut qb, query.page.limit, query.page.offset());
    qb
}

pub(crate) fn brand_count_query(query: &BrandListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM brands b");
    push_brand_filters(&mut qb, query);
    qb
}

#[async_trait]
impl BrandRepository for PgBrandRepository {
    async fn insert(&self, payload: &BrandPayload) -> DomainResult<Brand> {
        let row = sqlx::query("INSERT INTO brands (name) VALUES ($1) RETURNING id, name")
            .bind(&payload.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        row_to_brand(&row).map_err(|e| map_db_error(e, ENTITY))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Brand>> {
        let row = sqlx::query("SELECT b.id, b.name FROM brands b WHERE b.id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        row.as_ref()
            .map(row_to_brand)
            .transpose()
            .map_err(|e| map_db_error(e, ENTITY))
    }

    async fn find_by_name(&self, name: &str) -> DomainResult<Option<Brand>> {
        let row = sqlx::query("SELECT b.id, b.name FROM brands b WHERE b.name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        row.as_ref()
            .map(row_to_brand)
            .transpose()
            .map_err(|e| map_db_error(e, ENTITY))
    }

    async fn list(&self, query: &BrandListQuery) -> DomainResult<Page<Brand>> {
        let rows = brand_page_query(query)
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        let total: i64 = brand_count_query(query)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;

        let items = rows
            .iter()
            .map(row_to_brand)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_db_error(e, ENTITY))?;
        Ok(Page::new(items, query.page, count_to_total(total)))
    }

    async fn update(&self, id: i32, payload: &BrandPayload) -> DomainResult<Option<Brand>> {
        let row = sqlx::query("UPDATE brands SET name = $1 WHERE id = $2 RETURNING id, name")
            .bind(&payload.name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        row.as_ref()
            .map(row_to_brand)
            .transpose()
            .map_err(|e| map_db_error(e, ENTITY))
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        Ok(result.rows_affected() > 0)
    }
}

use super::{
    count_to_total, map_db_error, push_condition, push_order, push_page, row_to_car, CAR_COLUMNS,
};
use crate::domain::query::like_pattern;
use crate::domain::{Car, CarFilters, CarListQuery, CarPayload, DomainResult, Page};
use crate::storage::CarRepository;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

const ENTITY: &str = "Car";

const CAR_FROM: &str =
    " FROM cars c JOIN models m ON m.id = c.model_id JOIN brands b ON b.id = m.brand_id";

pub struct PgCarRepository {
    pool: PgPool,
}

impl PgCarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends one predicate per present filter, joined with `AND`.
fn push_car_filters(qb: &mut QueryBuilder<'static, Postgres>, filters: &CarFilters) {
    let mut has_where = false;

    if let Some(year) = filters.year {
        push_condition(qb, &mut has_where);
        qb.push("c.year = ").push_bind(year);
    }
    if let Some(year_gte) = filters.year_gte {
        push_condition(qb, &mut has_where);
        qb.push("c.year >= ").push_bind(year_gte);
    }
    if let Some(year_lte) = filters.year_lte {
        push_condition(qb, &mut has_where);
        qb.push("c.year <= ").push_bind(year_lte);
    }
    if let Some(value_gte) = filters.value_gte {
        push_condition(qb, &mut has_where);
        qb.push("c.value >= ").push_bind(value_gte);
    }
    if let Some(value_lte) = filters.value_lte {
        push_condition(qb, &mut has_where);
        qb.push("c.value <= ").push_bind(value_lte);
    }
    if let Some(ports) = filters.number_of_ports {
        push_condition(qb, &mut has_where);
        qb.push("c.number_of_ports = ").push_bind(ports);
    }
    if let Some(color) = &filters.color {
        push_condition(qb, &mut has_where);
        qb.push("c.color ILIKE ").push_bind(like_pattern(color));
    }
    if let Some(fuel) = &filters.fuel {
        push_condition(qb, &mut has_where);
        qb.push("c.fuel ILIKE ").push_bind(like_pattern(fuel));
    }
    if let Some(brand_name) = &filters.brand_name {
        push_condition(qb, &mut has_where);
        qb.push("b.name ILIKE ").push_bind(like_pattern(brand_name));
    }
    if let Some(model_id) = filters.model_id {
        push_condition(qb, &mut has_where);
        qb.push("c.model_id = ").push_bind(model_id);
    }
}

pub(crate) fn car_page_query(query: &CarListQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {}{}", CAR_COLUMNS, CAR_FROM));
    push_car_filters(&mut qb, &query.filters);
    push_order(&mut qb, query.sort_by.column(), query.order, "c.id");
    push_page(&mut qb, query.page.limit, query.page.offset());
    qb
}

pub(crate) fn car_count_query(filters: &CarFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*){}", CAR_FROM));
    push_car_filters(&mut qb, filters);
    qb
}

#[async_trait]
impl CarRepository for PgCarRepository {
    async fn insert(&self, payload: &CarPayload) -> DomainResult<Car> {
        let sql = format!(
            "WITH c AS (
                INSERT INTO cars (color, year, number_of_ports, fuel, value, model_id)
                VALUES ($1, $2, $3, $4, $5, $6) RETURNING *
             )
             SELECT {} FROM c JOIN models m ON m.id = c.model_id JOIN brands b ON b.id = m.brand_id",
            CAR_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&payload.color)
            .bind(payload.year)
            .bind(payload.number_of_ports)
            .bind(&payload.fuel)
            .bind(payload.value)
            .bind(payload.model_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        row_to_car(&row).map_err(|e| map_db_error(e, ENTITY))
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Car>> {
        let sql = format!("SELECT {}{} WHERE c.id = $1", CAR_COLUMNS, CAR_FROM);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        row.as_ref()
            .map(row_to_car)
            .transpose()
            .map_err(|e| map_db_error(e, ENTITY))
    }

    async fn list(&self, query: &CarListQuery) -> DomainResult<Page<Car>> {
        let mut page_query = car_page_query(query);
        debug!(sql = page_query.sql(), "listing cars");

        let rows = page_query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        let total = car_count_query(&query.filters)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;

        let items = rows
            .iter()
            .map(row_to_car)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_db_error(e, ENTITY))?;
        Ok(Page::new(items, query.page, count_to_total(total)))
    }

    async fn update(&self, id: i32, payload: &CarPayload) -> DomainResult<Option<Car>> {
        let sql = format!(
            "WITH c AS (
                UPDATE cars
                SET color = $1, year = $2, number_of_ports = $3, fuel = $4, value = $5, model_id = $6
                WHERE id = $7 RETURNING *
             )
             SELECT {} FROM c JOIN models m ON m.id = c.model_id JOIN brands b ON b.id = m.brand_id",
            CAR_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&payload.color)
            .bind(payload.year)
            .bind(payload.number_of_ports)
            .bind(&payload.fuel)
            .bind(payload.value)
            .bind(payload.model_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, ENTITY))?;
        row.as_ref()
            .map(row_to_car)
            .transpose()
            .map_err(|e| map_db_error(e, ENTITY))
    }

    async fn delete(&self, id: i32) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM cars WHERE id = $1")
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
    use crate::domain::{CarSortField, PageRequest, SortOrder};

    fn list_query(filters: CarFilters, sort_by: CarSortField, order: SortOrder) -> CarListQuery {
        CarListQuery {
            filters,
            sort_by,
            order,
            page: PageRequest { page: 3, limit: 50 },
        }
    }

    #[test]
    fn no_filters_means_no_where_clause() {
        let qb = car_count_query(&CarFilters::default());
        assert_eq!(qb.sql(), format!("SELECT COUNT(*){}", CAR_FROM));
    }

    #[test]
    fn filters_are_conjoined_in_a_fixed_order() {
        let filters = CarFilters {
            year_gte: Some(2019),
            year_lte: Some(2022),
            color: Some("Vermelho".into()),
            number_of_ports: Some(4),
            brand_name: Some("fiat".into()),
            ..Default::default()
        };
        let qb = car_count_query(&filters);
        assert!(qb.sql().ends_with(
            " WHERE c.year >= $1 AND c.year <= $2 AND c.number_of_ports = $3 \
             AND c.color ILIKE $4 AND b.name ILIKE $5"
        ));
    }

    #[test]
    fn page_query_orders_with_id_tie_breaker() {
        let qb = car_page_query(&list_query(
            CarFilters {
                model_id: Some(2),
                ..Default::default()
            },
            CarSortField::Year,
            SortOrder::Desc,
        ));
        assert!(qb.sql().ends_with(
            " WHERE c.model_id = $1 ORDER BY c.year DESC, c.id ASC LIMIT $2 OFFSET $3"
        ));
    }

    #[test]
    fn sorting_by_id_has_no_tie_breaker() {
        let qb = car_page_query(&list_query(
            CarFilters::default(),
            CarSortField::Id,
            SortOrder::Asc,
        ));
        assert!(qb
            .sql()
            .ends_with(" JOIN brands b ON b.id = m.brand_id ORDER BY c.id ASC LIMIT $1 OFFSET $2"));
    }
}

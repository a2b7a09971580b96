//! PostgreSQL repositories built on a shared `sqlx::PgPool`.
//!
//! All user-provided values reach SQL through bound parameters. Column and
//! direction fragments come from closed enums (`*SortField`, `SortOrder`).

use crate::domain::{Brand, Car, CarModel, DomainError, SortOrder};
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row};

pub mod brands;
pub mod cars;
pub mod models;

pub use brands::PgBrandRepository;
pub use cars::PgCarRepository;
pub use models::PgModelRepository;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub(crate) const MODEL_COLUMNS: &str =
    "m.id, m.name, m.brand_id, m.fipe_value, b.name AS brand_name";

pub(crate) const CAR_COLUMNS: &str = "c.id, c.color, c.year, c.number_of_ports, c.fuel, c.value, c.model_id, \
     m.name AS model_name, m.brand_id, m.fipe_value, b.name AS brand_name";

/// Maps driver errors onto the domain taxonomy.
///
/// Constraint violations become the same errors the services raise after their
/// explicit checks, so a lost race yields Conflict/Validation rather than Internal.
pub(crate) fn map_db_error(err: sqlx::Error, entity: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return DomainError::conflict(format!("{} with this name already exists", entity));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return DomainError::validation("referenced entity does not exist");
            }
            _ => {}
        }
    }
    DomainError::internal(format!("Database error: {}", err))
}

/// Appends ` WHERE ` for the first predicate and ` AND ` afterwards.
pub(crate) fn push_condition(qb: &mut QueryBuilder<'_, Postgres>, has_where: &mut bool) {
    qb.push(if *has_where { " AND " } else { " WHERE " });
    *has_where = true;
}

/// Appends `ORDER BY`, keeping `id_column` as tie-breaker so pages are stable.
pub(crate) fn push_order(
    qb: &mut QueryBuilder<'_, Postgres>,
    column: &'static str,
    order: SortOrder,
    id_column: &'static str,
) {
    qb.push(" ORDER BY ")
        .push(column)
        .push(" ")
        .push(order.as_sql());
    if column != id_column {
        qb.push(", ").push(id_column).push(" ASC");
    }
}

pub(crate) fn push_page(qb: &mut QueryBuilder<'_, Postgres>, limit: u32, offset: i64) {
    qb.push(" LIMIT ")
        .push_bind(i64::from(limit))
        .push(" OFFSET ")
        .push_bind(offset);
}

pub(crate) fn count_to_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

pub(crate) fn row_to_brand(row: &PgRow) -> Result<Brand, sqlx::Error> {
    Ok(Brand {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

/// Maps a row selected with [`MODEL_COLUMNS`].
pub(crate) fn row_to_model(row: &PgRow) -> Result<CarModel, sqlx::Error> {
    let brand_id: i32 = row.try_get("brand_id")?;
    Ok(CarModel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        brand_id,
        fipe_value: row.try_get("fipe_value")?,
        brand: Some(Brand {
            id: brand_id,
            name: row.try_get("brand_name")?,
        }),
    })
}

/// Maps a row selected with [`CAR_COLUMNS`].
pub(crate) fn row_to_car(row: &PgRow) -> Result<Car, sqlx::Error> {
    let model_id: i32 = row.try_get("model_id")?;
    let brand_id: i32 = row.try_get("brand_id")?;
    Ok(Car {
        id: row.try_get("id")?,
        color: row.try_get("color")?,
        year: row.try_get("year")?,
        number_of_ports: row.try_get("number_of_ports")?,
        fuel: row.try_get("fuel")?,
        value: row.try_get("value")?,
        model_id,
        model: Some(CarModel {
            id: model_id,
            name: row.try_get("model_name")?,
            brand_id,
            fipe_value: row.try_get("fipe_value")?,
            brand: Some(Brand {
                id: brand_id,
                name: row.try_get("brand_name")?,
            }),
        }),
    })
}

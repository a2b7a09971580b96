use crate::domain::error::{DomainError, DomainResult};
use crate::domain::model::CarModel;
use crate::domain::query::{contains_ignore_case, PageRequest, SortOrder};
use crate::domain::validation::{
    max_manufacture_year, validate_payload, validate_safe_text, MIN_MANUFACTURE_YEAR,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A single vehicle in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: i32,
    pub color: String,
    pub year: i32,
    pub number_of_ports: i32,
    pub fuel: String,
    pub value: f64,
    pub model_id: i32,
    /// Eager-loaded model, including its brand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<CarModel>,
}

/// Body of `POST /api/cars` and `PUT /api/cars/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarPayload {
    #[validate(
        length(min = 2, max = 30, message = "must be between 2 and 30 characters"),
        custom = "validate_safe_text"
    )]
    #[schema(example = "Vermelho")]
    pub color: String,
    #[validate(range(min = 1886, message = "must be 1886 or later"))]
    #[schema(example = 2021)]
    pub year: i32,
    #[validate(range(min = 1, message = "must be at least 1"))]
    #[schema(example = 4)]
    pub number_of_ports: i32,
    #[validate(
        length(min = 2, max = 30, message = "must be between 2 and 30 characters"),
        custom = "validate_safe_text"
    )]
    #[schema(example = "Flex")]
    pub fuel: String,
    #[schema(example = 55000.0)]
    pub value: f64,
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub model_id: i32,
}

impl CarPayload {
    pub fn normalized(mut self) -> DomainResult<Self> {
        self.color = self.color.trim().to_string();
        self.fuel = self.fuel.trim().to_string();

        let mut problems = Vec::new();
        if let Err(DomainError::Validation(msg)) = validate_payload(&self) {
            problems.push(msg);
        }
        let max_year = max_manufacture_year();
        if self.year >= MIN_MANUFACTURE_YEAR && self.year > max_year {
            problems.push(format!("year: must not be later than {}", max_year));
        }
        if !self.value.is_finite() || self.value <= 0.0 {
            problems.push("value: must be greater than 0".to_string());
        }

        if problems.is_empty() {
            Ok(self)
        } else {
            Err(DomainError::Validation(problems.join("; ")))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CarSortField {
    #[default]
    Id,
    Year,
    Color,
    Fuel,
    NumberOfPorts,
    Value,
}

impl CarSortField {
    /// Unknown fields fall back to `id` rather than failing the request.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("year") => CarSortField::Year,
            Some("color") => CarSortField::Color,
            Some("fuel") => CarSortField::Fuel,
            Some("numberOfPorts") => CarSortField::NumberOfPorts,
            Some("value") => CarSortField::Value,
            _ => CarSortField::Id,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            CarSortField::Id => "c.id",
            CarSortField::Year => "c.year",
            CarSortField::Color => "LOWER(c.color)",
            CarSortField::Fuel => "LOWER(c.fuel)",
            CarSortField::NumberOfPorts => "c.number_of_ports",
            CarSortField::Value => "c.value",
        }
    }
}

/// Optional, independently combinable predicates over cars. Absent fields add
/// no predicate; present fields are AND-ed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarFilters {
    pub year: Option<i32>,
    pub year_gte: Option<i32>,
    pub year_lte: Option<i32>,
    pub value_gte: Option<f64>,
    pub value_lte: Option<f64>,
    pub number_of_ports: Option<i32>,
    pub color: Option<String>,
    pub fuel: Option<String>,
    pub brand_name: Option<String>,
    pub model_id: Option<i32>,
}

impl CarFilters {
    /// Evaluates the filters against a fully loaded car (model and brand attached).
    pub fn matches(&self, car: &Car) -> bool {
        let brand_name = car
            .model
            .as_ref()
            .and_then(|m| m.brand.as_ref())
            .map(|b| b.name.as_str())
            .unwrap_or_default();

        self.year.map_or(true, |y| car.year == y)
            && self.year_gte.map_or(true, |y| car.year >= y)
            && self.year_lte.map_or(true, |y| car.year <= y)
            && self.value_gte.map_or(true, |v| car.value >= v)
            && self.value_lte.map_or(true, |v| car.value <= v)
            && self.number_of_ports.map_or(true, |n| car.number_of_ports == n)
            && self.model_id.map_or(true, |id| car.model_id == id)
            && self
                .color
                .as_deref()
                .map_or(true, |c| contains_ignore_case(&car.color, c))
            && self
                .fuel
                .as_deref()
                .map_or(true, |f| contains_ignore_case(&car.fuel, f))
            && self
                .brand_name
                .as_deref()
                .map_or(true, |b| contains_ignore_case(brand_name, b))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarListQuery {
    pub filters: CarFilters,
    pub sort_by: CarSortField,
    pub order: SortOrder,
    pub page: PageRequest,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::brand::Brand;

    fn payload() -> CarPayload {
        CarPayload {
            color: " Vermelho ".into(),
            year: 2020,
            number_of_ports: 4,
            fuel: "Flex".into(),
            value: 50000.0,
            model_id: 1,
        }
    }

    fn car(color: &str, year: i32, ports: i32, brand: &str) -> Car {
        Car {
            id: 1,
            color: color.into(),
            year,
            number_of_ports: ports,
            fuel: "Gasolina".into(),
            value: 40000.0,
            model_id: 7,
            model: Some(CarModel {
                id: 7,
                name: "Gol".into(),
                brand_id: 3,
                fipe_value: 35000.0,
                brand: Some(Brand {
                    id: 3,
                    name: brand.into(),
                }),
            }),
        }
    }

    #[test]
    fn normalizes_valid_payload() {
        let p = payload().normalized().unwrap();
        assert_eq!(p.color, "Vermelho");
    }

    #[test]
    fn rejects_out_of_range_numbers() {
        let mut p = payload();
        p.year = 1885;
        p.number_of_ports = 0;
        p.value = 0.0;
        let DomainError::Validation(msg) = p.normalized().unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(msg.contains("year: must be 1886 or later"), "{msg}");
        assert!(msg.contains("numberOfPorts: must be at least 1"), "{msg}");
        assert!(msg.contains("value: must be greater than 0"), "{msg}");
    }

    #[test]
    fn rejects_future_years() {
        let mut p = payload();
        p.year = max_manufacture_year() + 1;
        assert!(p.normalized().is_err());
    }

    #[test]
    fn filters_combine_as_conjunction() {
        let filters = CarFilters {
            color: Some("verm".into()),
            number_of_ports: Some(4),
            ..Default::default()
        };
        assert!(filters.matches(&car("Vermelho", 2020, 4, "Fiat")));
        assert!(!filters.matches(&car("Vermelho", 2020, 2, "Fiat")));
        assert!(!filters.matches(&car("Azul", 2020, 4, "Fiat")));
        assert!(CarFilters::default().matches(&car("Azul", 2020, 2, "Fiat")));
    }

    #[test]
    fn ranges_are_closed_intervals() {
        let filters = CarFilters {
            year_gte: Some(2019),
            year_lte: Some(2021),
            ..Default::default()
        };
        assert!(filters.matches(&car("Azul", 2019, 2, "Fiat")));
        assert!(filters.matches(&car("Azul", 2021, 2, "Fiat")));
        assert!(!filters.matches(&car("Azul", 2022, 2, "Fiat")));
    }

    #[test]
    fn brand_name_traverses_model() {
        let filters = CarFilters {
            brand_name: Some("volks".into()),
            ..Default::default()
        };
        assert!(filters.matches(&car("Azul", 2020, 2, "Volkswagen")));
        assert!(!filters.matches(&car("Azul", 2020, 2, "Fiat")));
    }

    #[test]
    fn unknown_sort_falls_back_to_id() {
        assert_eq!(CarSortField::parse(Some("numberOfPorts")), CarSortField::NumberOfPorts);
        assert_eq!(CarSortField::parse(Some("brand")), CarSortField::Id);
    }
}

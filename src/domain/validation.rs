//! Input validation rules shared by every payload and query filter.
//!
//! Payload structs derive [`validator::Validate`] for lengths and numeric ranges
//! and route their string fields through [`validate_safe_text`]. The helpers
//! here flatten `validator`'s nested error maps into the single message carried
//! by [`DomainError::Validation`].

use crate::domain::error::{DomainError, DomainResult};
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// The first automobile was patented in 1886.
pub const MIN_MANUFACTURE_YEAR: i32 = 1886;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

// Apostrophes and semicolons are rejected even inside otherwise legitimate names.
static SQL_META: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"--|;|/\*|\*/|'|"|`"#).expect("valid regex"));

static SQL_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(union\s+(all\s+)?select|select\s+.+\s+from|insert\s+into|delete\s+from|drop\s+(table|database|schema|index)|update\s+\S+\s+set|alter\s+table|truncate\s+table|create\s+(table|database))\b|\bexec(ute)?\s*\(|\bor\s+\d+\s*=\s*\d+",
    )
    .expect("valid regex")
});

static SCRIPT_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)javascript\s*:|vbscript\s*:|\bon[a-z]+\s*=|\bscript\b|\beval\s*\(|\balert\s*\(|\bdocument\.cookie\b",
    )
    .expect("valid regex")
});

static ALLOWED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-ZÀ-ÖØ-öø-ÿ0-9 \-&.()]+$").expect("valid regex"));

fn text_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Rejects blank text, markup, SQL-injection-like sequences, script keywords and
/// anything outside the allow-listed charset.
pub fn validate_safe_text(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(text_error("blank", "must not be empty"));
    }
    if HTML_TAG.is_match(value) {
        return Err(text_error("html_tag", "must not contain HTML tags"));
    }
    if SQL_META.is_match(value) || SQL_KEYWORDS.is_match(value) {
        return Err(text_error(
            "sql_pattern",
            "contains characters or keywords that are not allowed",
        ));
    }
    if SCRIPT_KEYWORDS.is_match(value) {
        return Err(text_error("script", "must not contain script content"));
    }
    if !ALLOWED_CHARS.is_match(value) {
        return Err(text_error(
            "charset",
            "may only contain letters, digits, spaces and - & . ( )",
        ));
    }
    Ok(())
}

/// Validates a free-text query filter. Blank values count as "no filter".
pub fn check_filter_text(field: &str, value: Option<String>) -> DomainResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    validate_safe_text(trimmed)
        .map_err(|e| DomainError::validation(format!("{}: {}", field, message_of(&e))))?;
    Ok(Some(trimmed.to_string()))
}

/// Latest model year accepted for a car: manufacturers sell next year's models early.
pub fn max_manufacture_year() -> i32 {
    chrono::Utc::now().year() + 1
}

/// Runs the derived rules of `payload` and collapses failures into one message.
pub fn validate_payload<T: Validate>(payload: &T) -> DomainResult<()> {
    payload
        .validate()
        .map_err(|errors| DomainError::Validation(describe(&errors)))
}

/// Renders `errors` as `field: message` pairs ordered by field name.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);
    fields
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(move |e| format!("{}: {}", camel_case(field), message_of(e)))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn message_of(err: &ValidationError) -> String {
    err.message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("invalid value ({})", err.code))
}

/// `number_of_ports` -> `numberOfPorts`, matching the JSON field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(value: &str) -> Option<String> {
        validate_safe_text(value).err().map(|e| e.code.to_string())
    }

    #[test]
    fn accepts_ordinary_names() {
        for name in [
            "Chevrolet",
            "Citroën",
            "Mercedes-Benz",
            "Rolls & Royce (UK)",
            "Gol 1.0",
            "  Fiat  ",
        ] {
            assert_eq!(code(name), None, "{name} should be accepted");
        }
    }

    #[test]
    fn rejects_blank_and_markup() {
        assert_eq!(code("   ").as_deref(), Some("blank"));
        assert_eq!(code("<script>alert(1)</script>").as_deref(), Some("html_tag"));
        assert_eq!(code("<b>Fiat</b>").as_deref(), Some("html_tag"));
    }

    #[test]
    fn rejects_sql_sequences() {
        assert_eq!(code("DROP TABLE brands").as_deref(), Some("sql_pattern"));
        assert_eq!(code("x union select password").as_deref(), Some("sql_pattern"));
        assert_eq!(code("Fiat--").as_deref(), Some("sql_pattern"));
        assert_eq!(code("O'Brien").as_deref(), Some("sql_pattern"));
        assert_eq!(code("a or 1=1").as_deref(), Some("sql_pattern"));
    }

    #[test]
    fn rejects_script_keywords() {
        assert_eq!(code("javascript:void(0)").as_deref(), Some("script"));
        assert_eq!(code("eval (x)").as_deref(), Some("script"));
    }

    #[test]
    fn rejects_characters_outside_allow_list() {
        assert_eq!(code("Azul!").as_deref(), Some("charset"));
        assert_eq!(code("50%").as_deref(), Some("charset"));
        assert_eq!(code("fuel_type").as_deref(), Some("charset"));
        assert_eq!(code("Citroën ×").as_deref(), Some("charset"));
        assert_eq!(code("Azul ÷").as_deref(), Some("charset"));
        assert_eq!(code("Fiat\nUno").as_deref(), Some("charset"));
        assert_eq!(code("Fiat\tUno").as_deref(), Some("charset"));
        assert_eq!(code("Fiat\u{a0}Uno").as_deref(), Some("charset"));
        assert_eq!(code("Citroën C4 (Ação)"), None);
    }

    #[test]
    fn filter_text_treats_blank_as_absent() {
        assert_eq!(check_filter_text("color", None).unwrap(), None);
        assert_eq!(check_filter_text("color", Some("  ".into())).unwrap(), None);
        assert_eq!(
            check_filter_text("color", Some(" Azul ".into())).unwrap(),
            Some("Azul".to_string())
        );
        let err = check_filter_text("color", Some("<i>".into())).unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("color: must not contain HTML tags")
        );
    }

    #[test]
    fn camel_cases_field_names() {
        assert_eq!(camel_case("number_of_ports"), "numberOfPorts");
        assert_eq!(camel_case("name"), "name");
        assert_eq!(camel_case("brandId"), "brandId");
    }
}

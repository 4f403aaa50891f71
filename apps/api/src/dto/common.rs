use std::collections::HashMap;

use classroom_core::Validator;
use classroom_domain::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Filters};
use serde::Serialize;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Body returned after a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub result: &'static str,
}

impl DeleteResponse {
    pub fn success() -> Self {
        Self { result: "Success" }
    }
}

/// List parameters read from a raw query string.
///
/// Unparsable integers fall back to their defaults and are recorded in
/// `validator`, which the service reports together with paging failures.
#[derive(Debug)]
pub struct ListParams {
    pub text: String,
    pub filters: Filters,
    pub validator: Validator,
}

impl ListParams {
    pub fn from_query(
        query: &HashMap<String, String>,
        text_key: &str,
        sort_safelist: &'static [&'static str],
    ) -> Self {
        let mut validator = Validator::new();
        let mut filters = Filters::new(sort_safelist);

        filters.page = read_int(query, "page", DEFAULT_PAGE, &mut validator);
        filters.page_size = read_int(query, "page_size", DEFAULT_PAGE_SIZE, &mut validator);
        if let Some(sort) = read_string(query, "sort") {
            filters.sort = sort.to_owned();
        }

        Self {
            text: read_string(query, text_key).unwrap_or_default().to_owned(),
            filters,
            validator,
        }
    }
}

fn read_string<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn read_int(
    query: &HashMap<String, String>,
    key: &str,
    default: i64,
    validator: &mut Validator,
) -> i64 {
    let Some(value) = read_string(query, key) else {
        return default;
    };

    value.parse::<i64>().unwrap_or_else(|_| {
        validator.add_error(key, "must be an integer value");
        default
    })
}

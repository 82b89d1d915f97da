//! SQL and generated-code naming conventions.

use crate::error::{assure_model, Result};
use heck::{ToLowerCamelCase, ToSnakeCase};

/// `fooBar` / `FooBar` / `Foo_Bar__` -> `foo_bar`
pub fn field_sql_name(field_name: &str) -> String {
    cleanup_sql(&field_name.to_snake_case())
}

pub fn model_sql_name(model_name: &str) -> String {
    cleanup_sql(&model_name.to_snake_case())
}

/// Joins two already-converted names with a single `_`
pub fn concat_sql_names(first: &str, second: &str) -> String {
    format!("{}_{}", cleanup_sql(first), cleanup_sql(second))
}

/// `User` -> `userId`
pub fn id_field_name(model_name: &str) -> String {
    format!("{}Id", model_name.to_lower_camel_case())
}

pub fn default_adapter_name(model_name: &str, suffix: &str) -> String {
    format!("{}{}", model_name, suffix)
}

/// Collapses runs of `_` and strips them from both ends
fn cleanup_sql(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch == '_' && (cleaned.is_empty() || cleaned.ends_with('_')) {
            continue;
        }
        cleaned.push(ch);
    }
    while cleaned.ends_with('_') {
        cleaned.pop();
    }
    cleaned
}

/// Accepts `[A-Za-z_][A-Za-z0-9_]*`
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        None => false,
    };
    assure_model(valid, || format!("Invalid SQL identifier: `{}`", name))
}

//! Structured cache keys
//!
//! A key is `(operation, entity, discriminator)`. Its rendered form,
//! `list_<Entity>_<canonical options JSON>` or `get_<Entity>_<id>`, is what
//! substring invalidation matches against; structured invalidation compares
//! the whole entity name, ignoring ASCII case, so a custom entity spelled
//! like a known one shares its scope.

use std::fmt;

use clinicflow_common::impl_str_conversions;
use clinicflow_domain::{EntityType, RequestOptions};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOperation {
    List,
    Get,
}

impl_str_conversions!(CacheOperation {
    List => "list",
    Get => "get",
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: CacheOperation,
    entity: EntityType,
    discriminator: String,
}

impl CacheKey {
    /// Key for a list call; options that serialize to the same canonical
    /// JSON share one key
    pub fn list(entity: &EntityType, options: &RequestOptions) -> Self {
        Self {
            operation: CacheOperation::List,
            entity: entity.clone(),
            discriminator: canonical_options(options),
        }
    }

    /// Key for a paginated list call, kept in the list scope so writes
    /// invalidate it too
    pub fn page(entity: &EntityType, options: &RequestOptions) -> Self {
        Self {
            operation: CacheOperation::List,
            entity: entity.clone(),
            discriminator: format!("page:{}", canonical_options(options)),
        }
    }

    pub fn get(entity: &EntityType, id: &str) -> Self {
        Self { operation: CacheOperation::Get, entity: entity.clone(), discriminator: id.to_string() }
    }

    pub fn operation(&self) -> CacheOperation {
        self.operation
    }

    pub fn entity(&self) -> &EntityType {
        &self.entity
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    /// Exact match on operation and entity name; `discriminator` narrows
    /// further
    pub fn in_scope(
        &self,
        operation: CacheOperation,
        entity: &EntityType,
        discriminator: Option<&str>,
    ) -> bool {
        self.operation == operation
            && self.entity.name().eq_ignore_ascii_case(entity.name())
            && discriminator.map_or(true, |d| self.discriminator == d)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.operation, self.entity, self.discriminator)
    }
}

fn canonical_options(options: &RequestOptions) -> String {
    match serde_json::to_value(options) {
        Ok(value) => canonical_json(&value),
        // Only reachable with non-string map keys, which RequestOptions cannot hold
        Err(_) => String::from("{}"),
    }
}

/// Compact JSON with object keys sorted at every depth
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

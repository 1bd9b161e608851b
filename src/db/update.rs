use std::collections::HashMap;

use serde_json::Value;

use super::models::Item;

/// Attribute names that identify an item and must never be rewritten.
const IDENTITY_FIELDS: &[&str] = &["PK", "SK"];

/// A "set these fields" directive for a single stored item.
///
/// Both names and values are aliased (`#k0` / `:v0`, ...), so field names that
/// collide with reserved words (`status`, `date`, `content`, `order`) are safe.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    /// E.g. `SET #k0 = :v0, #k1 = :v1`.
    pub expression: String,
    /// Placeholder → attribute name.
    pub names: HashMap<String, String>,
    /// Placeholder → new value.
    pub values: HashMap<String, Value>,
}

impl UpdateExpression {
    /// Build a SET directive from a sparse field map.
    ///
    /// Identity fields are skipped. Returns `None` when nothing is left to set;
    /// callers decide whether that is an error.
    pub fn set_fields(fields: &Item) -> Option<Self> {
        let mut parts = Vec::new();
        let mut names = HashMap::new();
        let mut values = HashMap::new();

        for (i, (field, value)) in fields
            .iter()
            .filter(|(field, _)| !IDENTITY_FIELDS.contains(&field.as_str()))
            .enumerate()
        {
            let name_ph = format!("#k{i}");
            let value_ph = format!(":v{i}");
            parts.push(format!("{name_ph} = {value_ph}"));
            names.insert(name_ph, field.clone());
            values.insert(value_ph, value.clone());
        }

        if parts.is_empty() {
            return None;
        }

        Some(Self {
            expression: format!("SET {}", parts.join(", ")),
            names,
            values,
        })
    }

    /// Iterate over `(field, value)` pairs this directive sets.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().filter_map(|(name_ph, field)| {
            let value_ph = name_ph.replacen("#k", ":v", 1);
            self.values
                .get(&value_ph)
                .map(|value| (field.as_str(), value))
        })
    }
}

use serde_json::Value;

use super::types::Fields;

/// Exact-match predicate over record fields
///
/// Rendered to an Airtable `filterByFormula` expression for the HTTP store and
/// evaluated directly by the in-memory store. Values are always compared as
/// strings, the way Airtable formulas compare text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `{field}='value'`
    Eq { field: String, value: String },
    /// `AND(a, b, ...)`
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    /// Render as an Airtable formula with every value escaped as a string literal
    pub fn to_formula(&self) -> String {
        match self {
            Self::Eq { field, value } => format!("{{{field}}}='{}'", escape_formula_value(value)),
            Self::And(filters) => {
                let parts: Vec<String> = filters.iter().map(Filter::to_formula).collect();
                format!("AND({})", parts.join(", "))
            }
        }
    }

    pub(crate) fn matches(&self, fields: &Fields) -> bool {
        match self {
            Self::Eq { field, value } => field_as_text(fields.get(field)) == *value,
            Self::And(filters) => filters.iter().all(|f| f.matches(fields)),
        }
    }
}

/// Escape a value for use inside a single-quoted formula string literal
pub(crate) fn escape_formula_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

// Formulas see linked-record lists as their comma-joined values and blanks as ''
fn field_as_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| field_as_text(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Bool(b)) => (if *b { "1" } else { "0" }).to_string(),
        Some(other) => other.to_string(),
    }
}

use serde::Serialize;

/// Text-bound WHERE clause builder. `{}` in a clause becomes the next `$n`;
/// typed columns cast the text parameter in SQL (`$n::vacancy_category`).
#[derive(Debug, Default)]
pub struct Filters {
    clauses: Vec<String>,
    args: Vec<String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&mut self, clause: impl Into<String>) -> &mut Self {
        self.clauses.push(clause.into());
        self
    }

    pub fn push(&mut self, clause: &str, value: impl Into<String>) -> &mut Self {
        self.args.push(value.into());
        let placeholder = format!("${}", self.args.len());
        self.clauses.push(clause.replace("{}", &placeholder));
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Index of the placeholder that follows the filter arguments.
    pub fn next_index(&self) -> usize {
        self.args.len() + 1
    }

    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }
}

/// Serde name of a unit enum variant, as stored in the Postgres enum type.
pub fn wire_name<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

pub fn like_pattern(raw: &str) -> String {
    let escaped = raw
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

// src/report.rs
use std::fmt;

use crate::card::{CatalogEntry, Field};

#[derive(Clone, Debug, PartialEq)]
pub struct FieldStat {
    pub field: Field,
    pub missing: usize,
    pub filled_pct: f64,
}

/// How complete one set's descriptive fields are.
#[derive(Clone, Debug, PartialEq)]
pub struct SetReport {
    pub set_key: String,
    pub total: usize,
    pub fields: Vec<FieldStat>,
    /// Entries blank in at least one field
    pub incomplete: Vec<String>,
}

impl SetReport {
    pub fn missing(&self, field: Field) -> usize {
        self.fields.iter().find(|s| s.field == field).map_or(0, |s| s.missing)
    }
}

pub fn completeness(set_key: &str, entries: &[CatalogEntry]) -> SetReport {
    let total = entries.len();
    let fields = Field::ALL
        .into_iter()
        .map(|field| {
            let missing = entries.iter().filter(|e| e.is_blank(field)).count();
            let filled_pct = if total == 0 {
                100.0
            } else {
                (total - missing) as f64 * 100.0 / total as f64
            };
            FieldStat { field, missing, filled_pct }
        })
        .collect();
    let incomplete = entries
        .iter()
        .filter(|e| Field::ALL.iter().any(|f| e.is_blank(*f)))
        .map(|e| e.name.clone())
        .collect();

    SetReport { set_key: set_key.to_string(), total, fields, incomplete }
}

impl fmt::Display for SetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} cards)", self.set_key, self.total)?;
        for s in &self.fields {
            writeln!(f, "  {:<12} missing {:>4}  filled {:>5.1}%", s.field.key(), s.missing, s.filled_pct)?;
        }
        write!(f, "  incomplete entries: {}", self.incomplete.len())
    }
}

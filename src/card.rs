// src/card.rs
//! Card shapes shared by every stage.
//!
//! - [`RawCardRecord`]: the archive's card object, untyped, as fetched.
//! - [`ExtractedFields`]: the three descriptive fields pulled out of a record.
//! - [`CatalogEntry`]: one card in a local catalog file. Keys this crate does
//!   not know about ride along in `extra` and are written back untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::sanitize::is_blank;

/// Untyped card object from the remote source. Always a JSON object with a string `name`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawCardRecord {
    value: Value,
    #[serde(skip)]
    set_code: Option<String>,
}

impl RawCardRecord {
    /// Accepts any object with a string `name`; anything else is not a card.
    pub fn from_value(value: Value) -> Option<Self> {
        value.as_object()?.get("name")?.as_str()?;
        let mut rec = Self { value, set_code: None };
        let set_code = rec
            .variant_numbers()
            .next()
            .and_then(|n| n.split_once('-'))
            .map(|(prefix, _)| prefix.to_string());
        rec.set_code = set_code;
        Some(rec)
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    pub fn name(&self) -> &str {
        self.value.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn card_type(&self) -> Option<&str> {
        self.value.get("type").and_then(Value::as_str)
    }

    /// `cardVariants[*]` objects, in source order.
    pub fn variants(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.value
            .get("cardVariants")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }

    /// Identifying codes: every variant number, or the record's own
    /// `variantNumber`/`code` when it carries no variants.
    pub fn variant_numbers(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        let mut from_variants = self
            .variants()
            .filter_map(|v| v.get("variantNumber").and_then(Value::as_str))
            .peekable();
        if from_variants.peek().is_some() {
            return Box::new(from_variants);
        }
        let own = ["variantNumber", "code"]
            .into_iter()
            .find_map(|k| self.value.get(k).and_then(Value::as_str));
        Box::new(own.into_iter())
    }

    /// Set tag derived at decode time from the first variant number (`OGN-001` → `OGN`).
    pub fn set_code(&self) -> Option<&str> {
        self.set_code.as_deref()
    }

    /// Case-sensitive prefix test over the identifying codes.
    pub fn belongs_to(&self, prefix: &str) -> bool {
        self.variant_numbers().any(|n| n.starts_with(prefix))
    }
}

/// Absent (`None`) is not the same as empty; extraction never yields `Some("")`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub description: Option<String>,
    pub flavor_text: Option<String>,
    pub artist: Option<String>,
}

impl ExtractedFields {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Description => self.description.as_deref(),
            Field::FlavorText => self.flavor_text.as_deref(),
            Field::Artist => self.artist.as_deref(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Description,
    FlavorText,
    Artist,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Description, Field::FlavorText, Field::Artist];

    /// Key used in catalog files.
    pub fn key(self) -> &'static str {
        match self {
            Field::Description => "description",
            Field::FlavorText => "flavor_text",
            Field::Artist => "artist",
        }
    }

    pub fn from_key(s: &str) -> Option<Field> {
        let s = s.trim().to_ascii_lowercase().replace('-', "_");
        Field::ALL.into_iter().find(|f| f.key() == s || (s == "flavor" && *f == Field::FlavorText))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One card entry in a catalog file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,

    /// Gameplay and bookkeeping keys (energy, rarity, …), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CatalogEntry {
    pub fn named(name: &str) -> Self {
        Self { name: name.to_string(), ..Self::default() }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Description => self.description.as_deref(),
            Field::FlavorText => self.flavor_text.as_deref(),
            Field::Artist => self.artist.as_deref(),
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Description => &mut self.description,
            Field::FlavorText => &mut self.flavor_text,
            Field::Artist => &mut self.artist,
        };
        *slot = Some(value);
    }

    /// `None` and `""` are both blank.
    pub fn is_blank(&self, field: Field) -> bool {
        is_blank(self.get(field))
    }
}

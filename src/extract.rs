// src/extract.rs
//! Pull description, flavor text and artist out of a raw record.
//!
//! Each field has an ordered table of key paths; the first path that holds a
//! non-blank string wins. Unit-like cards keep flavor text on the variant,
//! spell-like cards usually on the card itself, so the flavor table depends
//! on `type`. Missing paths are normal and simply mean "absent".

use serde_json::Value;

use crate::card::{ExtractedFields, RawCardRecord};
use crate::core::json::{KeyPath, Step::*, first_str};

const DESCRIPTION: &[KeyPath] = &[
    &[Key("description")],
    &[Key("text")],
    &[Key("cardVariants"), Index(0), Key("description")],
];

const FLAVOR_UNIT: &[KeyPath] = &[
    &[Key("cardVariants"), Index(0), Key("flavorText")],
    &[Key("flavorText")],
    &[Key("cardVariants"), Index(0), Key("flavor")],
];

const FLAVOR_SPELL: &[KeyPath] = &[
    &[Key("flavorText")],
    &[Key("cardVariants"), Index(0), Key("flavorText")],
    &[Key("flavor")],
];

const ARTIST: &[KeyPath] = &[
    &[Key("cardVariants"), Index(0), Key("artist")],
    &[Key("artist")],
    &[Key("cardVariants"), Index(0), Key("illustrator")],
];

/// Variant-local paths, relative to one `cardVariants[i]` object.
const VARIANT_FLAVOR: &[KeyPath] = &[&[Key("flavorText")], &[Key("flavor")]];
const VARIANT_ARTIST: &[KeyPath] = &[&[Key("artist")], &[Key("illustrator")]];

const UNIT_TYPES: &[&str] = &["unit", "champion", "legend", "champion unit"];

fn is_unit_like(card_type: Option<&str>) -> bool {
    card_type.is_some_and(|t| UNIT_TYPES.iter().any(|u| t.trim().eq_ignore_ascii_case(u)))
}

fn flavor_paths(record: &RawCardRecord) -> &'static [KeyPath] {
    if is_unit_like(record.card_type()) { FLAVOR_UNIT } else { FLAVOR_SPELL }
}

pub fn extract(record: &RawCardRecord) -> ExtractedFields {
    let root = record.as_value();
    ExtractedFields {
        description: first_str(root, DESCRIPTION).map(str::to_string),
        flavor_text: first_str(root, flavor_paths(record)).map(str::to_string),
        artist: first_str(root, ARTIST).map(str::to_string),
    }
}

/// Like [`extract`], but flavor text and artist come from the variant whose
/// `variantNumber` equals `variant_number` when it has them.
pub fn extract_for_variant(record: &RawCardRecord, variant_number: &str) -> ExtractedFields {
    let mut fields = extract(record);
    let wanted = variant_number.trim();

    let Some(variant) = record
        .variants()
        .find(|v| v.get("variantNumber").and_then(Value::as_str) == Some(wanted))
    else {
        return fields;
    };
    // Map → Value so the same path walker applies
    let variant = Value::Object(variant.clone());

    if let Some(f) = first_str(&variant, VARIANT_FLAVOR) {
        fields.flavor_text = Some(f.to_string());
    }
    if let Some(a) = first_str(&variant, VARIANT_ARTIST) {
        fields.artist = Some(a.to_string());
    }
    fields
}

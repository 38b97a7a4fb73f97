//! Typed views of loaded documents.
//!
//! A loaded TOML document is a loose tree of `toml::Value`s. Before either
//! builder touches it, the top level is checked here against the known field
//! set and split into a [`FingeringSpec`] or [`LayoutSpec`]. Shape problems at
//! this level fail straight away; problems inside individual entries are left
//! to the builders, which report all of them at once.

use toml::{Table, Value};

use crate::errors::{ErrorMaker, Issue, ValidationError};

/// Top-level sections of a fingering document.
#[derive(Debug, Clone)]
pub struct FingeringSpec {
    /// Key name → `{ short_name?, press, description? }`
    pub keys: Table,
    /// Note name (or `all`) → whitespace-separated key names
    pub fingerings: Table,
    /// Instrument variant → lowest note
    pub lowest_c: Table,
    pub metadata: Table,
}

const FINGERING_FIELDS: [&str; 4] = ["fingerings", "keys", "lowest_c", "metadata"];
const FINGERING_REQUIRED: [&str; 2] = ["fingerings", "keys"];

impl FingeringSpec {
    pub fn from_value(doc: &Value) -> Result<Self, ValidationError> {
        match doc {
            Value::Table(table) => Self::from_document(table),
            _ => Err(ErrorMaker::new().fail(Issue::NotATable, &[&"fingering document"])),
        }
    }

    pub fn from_document(doc: &Table) -> Result<Self, ValidationError> {
        let mut err = ErrorMaker::new();
        check_fields(&mut err, doc, &FINGERING_FIELDS, &FINGERING_REQUIRED);

        let spec = Self {
            keys: section(&mut err, doc, "keys"),
            fingerings: section(&mut err, doc, "fingerings"),
            lowest_c: section(&mut err, doc, "lowest_c"),
            metadata: section(&mut err, doc, "metadata"),
        };
        err.check()?;
        Ok(spec)
    }
}

/// The `[layout]` section of a layout document.
#[derive(Debug, Clone)]
pub struct LayoutSpec {
    /// Definition id → SVG markup
    pub defs: Table,
    /// Piece name → `{ parts = { state = "def@class+..." }, x?, y? }`
    pub pieces: Table,
    pub spacing: i64,
    pub style: String,
    pub width: i64,
}

const LAYOUT_DOCUMENT_FIELDS: [&str; 1] = ["layout"];
const LAYOUT_FIELDS: [&str; 5] = ["defs", "pieces", "spacing", "style", "width"];
const LAYOUT_REQUIRED: [&str; 2] = ["defs", "pieces"];

impl LayoutSpec {
    pub fn from_document(doc: &Table) -> Result<Self, ValidationError> {
        let mut err = ErrorMaker::new();
        check_fields(&mut err, doc, &LAYOUT_DOCUMENT_FIELDS, &[]);
        let Some(Value::Table(layout)) = doc.get("layout") else {
            return Err(err.fail(Issue::NotATable, &[&"layout"]));
        };
        check_fields(&mut err, layout, &LAYOUT_FIELDS, &LAYOUT_REQUIRED);

        let spec = Self {
            defs: section(&mut err, layout, "defs"),
            pieces: section(&mut err, layout, "pieces"),
            spacing: integer(&mut err, layout, "spacing"),
            style: match layout.get("style") {
                None => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => {
                    err.record(Issue::InvalidValue, &[&"style", &other]);
                    String::new()
                }
            },
            width: integer(&mut err, layout, "width"),
        };
        err.check()?;
        Ok(spec)
    }
}

fn check_fields(err: &mut ErrorMaker, table: &Table, known: &[&str], required: &[&str]) {
    for name in table.keys().filter(|k| !known.iter().any(|f| *f == k.as_str())) {
        err.record(Issue::UnknownField, &[name]);
    }
    for name in required.iter().filter(|r| !table.contains_key(**r)) {
        err.record(Issue::MissingField, &[name]);
    }
}

/// A sub-table, empty when absent or recorded as invalid.
fn section(err: &mut ErrorMaker, table: &Table, name: &str) -> Table {
    match table.get(name) {
        None => Table::new(),
        Some(Value::Table(t)) => t.clone(),
        Some(_) => {
            err.record(Issue::InvalidValue, &[&name, &"expected a table"]);
            Table::new()
        }
    }
}

fn integer(err: &mut ErrorMaker, table: &Table, name: &str) -> i64 {
    match table.get(name) {
        None => 0,
        Some(Value::Integer(i)) => *i,
        Some(other) => {
            err.record(Issue::InvalidValue, &[&name, other]);
            0
        }
    }
}

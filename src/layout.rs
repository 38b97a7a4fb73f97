//! Layout builder: validates a [`LayoutSpec`] against the key names of a
//! fingering system and assembles a [`Layout`].

use std::collections::BTreeMap;

use toml::{Table, Value};
use tracing::{debug, warn};

use crate::errors::{BuildError, ErrorMaker, Issue, UnexpectedPolicy};
use crate::markup::Element;
use crate::model::{
    ChartPiece, Definition, KeyNames, Layout, Part, OFF_STATES, RESERVED_PREFIX,
};
use crate::spec::LayoutSpec;

/// Space left below the last piece for the label.
pub const BOTTOM_MARGIN: i64 = 20;

const PIECE_FIELDS: [&str; 3] = ["parts", "x", "y"];

#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOptions {
    pub policy: UnexpectedPolicy,
}

/// Validate `spec` and build the layout.
///
/// `valid_names` is every name a piece may be drawn for, usually the
/// fingering system's name resolver. Pieces whose name starts with `_` are
/// decorative and exempt.
pub fn build<N>(
    spec: &LayoutSpec,
    valid_names: &N,
    options: &LayoutOptions,
) -> Result<Layout, BuildError>
where
    N: KeyNames + ?Sized,
{
    let result = ErrorMaker::with_policy(options.policy).scope(|err| {
        let defs = read_defs(err, &spec.defs);

        let mut pieces = Vec::new();
        let (mut x, mut y) = (0, 0);
        for (name, value) in &spec.pieces {
            let Some(table) = value.as_table() else {
                err.record(Issue::MissingParts, &[name]);
                continue;
            };
            let Some(parts) = table.get("parts").and_then(Value::as_table) else {
                err.record(Issue::MissingParts, &[name]);
                continue;
            };
            if !(name.starts_with(RESERVED_PREFIX) || valid_names.contains_name(name)) {
                err.record(Issue::UnknownPieceName, &[name]);
            }
            for field in table.keys() {
                if !PIECE_FIELDS.iter().any(|f| *f == field.as_str()) {
                    err.record(Issue::UnknownField, &[name, field]);
                }
            }

            let parts = read_parts(err, name, parts);
            if !OFF_STATES.iter().any(|s| parts.contains_key(*s)) {
                err.record(Issue::MissingOffPart, &[name]);
            }
            let unknown: Vec<&str> = parts
                .values()
                .flatten()
                .map(|p| p.def_id.as_str())
                .filter(|id| !defs.iter().any(|d| d.id == *id))
                .collect();
            if !unknown.is_empty() {
                err.record(Issue::UnknownDefinition, &[name, &unknown.join(" ")]);
            }

            x = coordinate(err, name, table, "x").unwrap_or(x);
            y = coordinate(err, name, table, "y").unwrap_or(y);
            pieces.push(ChartPiece {
                name: name.clone(),
                parts,
                x,
                y,
            });
            match y.checked_add(spec.spacing) {
                Some(next) => y = next,
                None => err.record(Issue::InvalidValue, &[name, &"y", &"out of range"]),
            }
        }

        let height = y
            .checked_add(spec.spacing)
            .and_then(|h| h.checked_add(BOTTOM_MARGIN))
            .unwrap_or_else(|| {
                err.record(
                    Issue::InvalidValue,
                    &[&"spacing", &spec.spacing, &"canvas height out of range"],
                );
                0
            });

        Ok(Layout {
            defs,
            pieces,
            size: (spec.width, height),
            spacing: spec.spacing,
            style: spec.style.clone(),
        })
    });

    match &result {
        Ok(layout) => debug!(
            defs = layout.defs.len(),
            pieces = layout.pieces.len(),
            width = layout.size.0,
            height = layout.size.1,
            "built layout"
        ),
        Err(e) => warn!("layout document rejected: {e}"),
    }
    result
}

/// Parse every definition; ones with bad markup are recorded and dropped.
fn read_defs(err: &mut ErrorMaker, specs: &Table) -> Vec<Definition> {
    let mut defs = Vec::new();
    for (id, value) in specs {
        let Some(text) = value.as_str() else {
            err.record(Issue::BadMarkup, &[&"not a string", id, value]);
            continue;
        };
        match Element::parse(text) {
            Ok(element) => defs.push(Definition {
                id: id.clone(),
                element: element.with_attr("id", id.as_str()),
            }),
            Err(e) => err.record(Issue::BadMarkup, &[&e, id, &text]),
        }
    }
    defs
}

fn read_parts(err: &mut ErrorMaker, piece: &str, table: &Table) -> BTreeMap<String, Vec<Part>> {
    let mut parts = BTreeMap::new();
    for (state, value) in table {
        match value.as_str() {
            Some(text) => {
                parts.insert(state.clone(), Part::parse_all(text));
            }
            None => err.record(
                Issue::InvalidValue,
                &[&piece, &format!("parts.{state}"), value],
            ),
        }
    }
    parts
}

/// An explicit `x` or `y`, if the piece gives a valid one.
fn coordinate(err: &mut ErrorMaker, piece: &str, table: &Table, axis: &str) -> Option<i64> {
    match table.get(axis)? {
        Value::Integer(v) => Some(*v),
        other => {
            err.record(Issue::InvalidValue, &[&piece, &axis, other]);
            None
        }
    }
}

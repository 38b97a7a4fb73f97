//! Data model for validated fingering systems and chart layouts.
//!
//! These structures are produced by the builders in [`crate::fingering`] and
//! [`crate::layout`] and are immutable once built.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use crate::markup::Element;
use crate::note::PitchedNote;

/// Prefix marking a piece that is purely decorative and names no key.
pub const RESERVED_PREFIX: char = '_';

/// State labels accepted for the unpressed look of a piece, in lookup order.
pub const OFF_STATES: [&str; 2] = ["_off", "off"];

/// A pressable key (or hole, or lever) of an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Key {
    /// Name the key was declared under
    pub name: String,
    /// Short alias, unique across the fingering system
    pub short_name: Option<String>,
    /// How to press it, e.g. "left thumb"
    pub press: String,
    /// Free-form description
    pub description: String,
}

/// A validated fingering system.
#[derive(Debug, Clone, Serialize)]
pub struct FingeringSystem {
    /// All keys in canonical left-to-right order
    pub all_keys: Vec<Rc<Key>>,
    /// Keys pressed for each note, in canonical order, lowest note first
    pub fingerings: BTreeMap<PitchedNote, Vec<Rc<Key>>>,
    /// Keys by declared name
    pub keys: BTreeMap<String, Rc<Key>>,
    /// Lowest note per instrument variant (e.g. "soprano" → C5)
    pub lowest_c: BTreeMap<String, PitchedNote>,
    /// Keys by declared name and by short name
    pub to_key: BTreeMap<String, Rc<Key>>,
    /// Free-form metadata
    pub metadata: BTreeMap<String, String>,
}

impl FingeringSystem {
    /// Look up a key by declared name or short name.
    pub fn key(&self, name: &str) -> Option<&Rc<Key>> {
        self.to_key.get(name)
    }

    pub fn fingering(&self, note: &PitchedNote) -> Option<&[Rc<Key>]> {
        self.fingerings.get(note).map(Vec::as_slice)
    }

    /// Position of `key` in [`all_keys`](Self::all_keys).
    pub fn position(&self, key: &Key) -> Option<usize> {
        self.all_keys.iter().position(|k| k.name == key.name)
    }
}

/// Name membership test the layout builder checks piece names against.
///
/// The fingering side only has to provide this, so the two builders stay
/// independent of each other.
pub trait KeyNames {
    fn contains_name(&self, name: &str) -> bool;
}

impl<V> KeyNames for BTreeMap<String, V> {
    fn contains_name(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl<V, S: std::hash::BuildHasher> KeyNames for std::collections::HashMap<String, V, S> {
    fn contains_name(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl KeyNames for [&str] {
    fn contains_name(&self, name: &str) -> bool {
        self.iter().any(|n| *n == name)
    }
}

impl KeyNames for FingeringSystem {
    fn contains_name(&self, name: &str) -> bool {
        self.to_key.contains_key(name)
    }
}

/// One drawable reference in a piece state: a definition id plus an
/// optional CSS class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    /// Id of the definition to draw
    pub def_id: String,
    /// CSS class, empty for none
    pub style: String,
}

impl Part {
    /// Parse the compact `def[@class]+def[@class]` syntax.
    pub fn parse_all(s: &str) -> Vec<Part> {
        s.split('+')
            .map(|p| {
                let (def_id, style) = p.split_once('@').unwrap_or((p, ""));
                Part {
                    def_id: def_id.trim().to_string(),
                    style: style.trim().to_string(),
                }
            })
            .collect()
    }
}

/// The drawing of one key, with one variant per state.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPiece {
    /// Piece name: a key name, or a decorative name starting with `_`
    pub name: String,
    /// Parts to draw for each state label
    pub parts: BTreeMap<String, Vec<Part>>,
    pub x: i64,
    pub y: i64,
}

impl ChartPiece {
    /// Parts for the unpressed state.
    pub fn off_parts(&self) -> Option<&[Part]> {
        OFF_STATES
            .iter()
            .find_map(|state| self.parts.get(*state))
            .map(Vec::as_slice)
    }

    /// Parts for the first pressed name this piece has a variant for, or the
    /// off state.
    pub fn select<S: AsRef<str>>(&self, pressed: &[S]) -> &[Part] {
        pressed
            .iter()
            .filter_map(|p| self.parts.get(p.as_ref()))
            .find(|parts| !parts.is_empty())
            .map(Vec::as_slice)
            .or_else(|| self.off_parts())
            .unwrap_or(&[])
    }
}

/// A named reusable drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub id: String,
    /// Parsed markup, with its `id` attribute set to [`id`](Self::id)
    pub element: Element,
}

/// A validated chart layout.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    /// Reusable drawings, in declaration order
    pub defs: Vec<Definition>,
    /// One piece per drawn key, in declaration order
    pub pieces: Vec<ChartPiece>,
    /// Canvas (width, height)
    pub size: (i64, i64),
    /// Vertical distance between successive pieces
    pub spacing: i64,
    /// CSS passed through to the output
    pub style: String,
}

impl Layout {
    pub fn definition(&self, id: &str) -> Option<&Definition> {
        self.defs.iter().find(|d| d.id == id)
    }

    pub fn piece(&self, name: &str) -> Option<&ChartPiece> {
        self.pieces.iter().find(|p| p.name == name)
    }
}

//! Fingering system builder: validates a [`FingeringSpec`] and assembles a
//! [`FingeringSystem`].
//!
//! The whole document is checked in one pass. A bad key, note or fingering is
//! recorded and skipped so that every problem in the document is reported
//! together.

use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;
use toml::{Table, Value};
use tracing::{debug, warn};

use crate::errors::{BuildError, ErrorMaker, Issue, UnexpectedPolicy};
use crate::model::{FingeringSystem, Key};
use crate::note::PitchedNote;
use crate::spec::FingeringSpec;

/// Fingering entry that lists every key in canonical order.
pub const ALL_KEYS_ENTRY: &str = "all";

const KEY_FIELDS: [&str; 3] = ["short_name", "press", "description"];

/// Switches for [`build`].
#[derive(Debug, Clone, Copy)]
pub struct FingeringOptions {
    /// Require each fingering to list keys in `all` order
    pub check_key_order: bool,
    /// Let a later enharmonic spelling replace an earlier one instead of
    /// reporting a duplicate note
    pub allow_enharmonic_aliases: bool,
    pub policy: UnexpectedPolicy,
}

impl Default for FingeringOptions {
    fn default() -> Self {
        Self {
            check_key_order: true,
            allow_enharmonic_aliases: false,
            policy: UnexpectedPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {reason}")]
pub struct InvalidKeyError {
    pub name: String,
    pub reason: String,
}

impl Key {
    /// Build a key from its `[keys.<name>]` table.
    pub fn from_value(name: &str, value: &Value) -> Result<Key, InvalidKeyError> {
        let invalid = |reason: String| InvalidKeyError {
            name: name.to_string(),
            reason,
        };
        let Value::Table(table) = value else {
            return Err(invalid(format!("expected a table, got {}", value.type_str())));
        };
        let unknown = table.keys().find(|k| !KEY_FIELDS.iter().any(|f| *f == k.as_str()));
        if let Some(field) = unknown {
            return Err(invalid(format!("unknown field '{field}'")));
        }

        let string = |field: &str| -> Result<Option<String>, InvalidKeyError> {
            match table.get(field) {
                None => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(other) => Err(invalid(format!(
                    "'{field}' should be a string, got {}",
                    other.type_str()
                ))),
            }
        };

        let press = string("press")?.ok_or_else(|| invalid("missing 'press'".to_string()))?;
        Ok(Key {
            name: name.to_string(),
            short_name: string("short_name")?.filter(|s| !s.is_empty()),
            press,
            description: string("description")?.unwrap_or_default(),
        })
    }
}

/// Validate `spec` and build the fingering system.
pub fn build(
    spec: &FingeringSpec,
    options: &FingeringOptions,
) -> Result<FingeringSystem, BuildError> {
    let result = ErrorMaker::with_policy(options.policy).scope(|err| {
        let keys = build_keys(err, &spec.keys);
        let to_key = name_resolver(err, &keys);

        let (all, fingerings) = read_fingerings(err, &spec.fingerings, &to_key, options);
        let all_keys = all.unwrap_or_else(|| keys.clone());

        if options.check_key_order {
            for (note, pressed) in &fingerings {
                check_order(err, note, pressed, &all_keys);
            }
        }

        let lowest_c = read_lowest_notes(err, &spec.lowest_c);
        let metadata = read_metadata(err, &spec.metadata);

        Ok(FingeringSystem {
            all_keys,
            fingerings,
            keys: keys.iter().map(|k| (k.name.clone(), Rc::clone(k))).collect(),
            lowest_c,
            to_key,
            metadata,
        })
    });

    match &result {
        Ok(system) => debug!(
            keys = system.keys.len(),
            notes = system.fingerings.len(),
            "built fingering system"
        ),
        Err(e) => warn!("fingering document rejected: {e}"),
    }
    result
}

/// Keys in declaration order; invalid ones are recorded and left out.
fn build_keys(err: &mut ErrorMaker, specs: &Table) -> Vec<Rc<Key>> {
    let mut keys = Vec::new();
    for (name, value) in specs {
        match Key::from_value(name, value) {
            Ok(key) => keys.push(Rc::new(key)),
            Err(e) => err.record(Issue::InvalidKey, &[&e]),
        }
    }
    keys
}

/// Map every declared name and short name to its key.
fn name_resolver(err: &mut ErrorMaker, keys: &[Rc<Key>]) -> BTreeMap<String, Rc<Key>> {
    err.record_duplicates(
        Issue::DuplicateShortName,
        keys.iter().filter_map(|k| k.short_name.as_deref()),
        &[],
    );

    let mut to_key: BTreeMap<String, Rc<Key>> = BTreeMap::new();
    for key in keys {
        if let Some(short) = &key.short_name {
            let shadowed = keys
                .iter()
                .find(|other| other.name == *short && other.name != key.name);
            if let Some(other) = shadowed {
                err.record(
                    Issue::DuplicateShortName,
                    &[short, &format!("short name of {} is the name of {}", key.name, other.name)],
                );
            }
            to_key.insert(short.clone(), Rc::clone(key));
        }
    }
    // Declared names take precedence over short names.
    for key in keys {
        to_key.insert(key.name.clone(), Rc::clone(key));
    }
    to_key
}

type Fingerings = BTreeMap<PitchedNote, Vec<Rc<Key>>>;

/// Resolve every fingering entry. Returns the `all` entry separately.
fn read_fingerings(
    err: &mut ErrorMaker,
    entries: &Table,
    to_key: &BTreeMap<String, Rc<Key>>,
    options: &FingeringOptions,
) -> (Option<Vec<Rc<Key>>>, Fingerings) {
    let mut all = None;
    let mut fingerings = Fingerings::new();

    for (entry, value) in entries {
        let Value::String(text) = value else {
            err.record(Issue::InvalidFingering, &[entry, value]);
            continue;
        };

        let note = if entry == ALL_KEYS_ENTRY {
            None
        } else {
            match PitchedNote::parse(entry) {
                Ok(note) => Some(note),
                Err(e) => {
                    err.record(Issue::InvalidNote, &[&e.text]);
                    continue;
                }
            }
        };

        let names: Vec<&str> = text.split_whitespace().collect();
        let unknown: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !to_key.contains_key(*n))
            .collect();
        if !unknown.is_empty() {
            err.record(Issue::UnknownKey, &[entry, &unknown.join(" ")]);
        }
        // A key may be listed by its name or its short name; compare keys.
        let pressed: Vec<Rc<Key>> = names
            .iter()
            .filter_map(|n| to_key.get(*n))
            .map(Rc::clone)
            .collect();
        let unique = err.record_duplicates(
            Issue::DuplicateKeyInFingering,
            pressed.iter().map(|k| k.name.as_str()),
            &[entry],
        );
        if !unique || !unknown.is_empty() {
            continue;
        }

        match note {
            None => all = Some(pressed),
            Some(note) => {
                if let Some((existing, _)) = fingerings.get_key_value(&note) {
                    if !options.allow_enharmonic_aliases {
                        err.record(Issue::DuplicateNote, &[existing, &note]);
                        continue;
                    }
                    fingerings.remove(&note);
                }
                fingerings.insert(note, pressed);
            }
        }
    }

    (all, fingerings)
}

/// Record the first key of `pressed` that is not strictly after its
/// predecessor in `all_keys`.
fn check_order(
    err: &mut ErrorMaker,
    note: &PitchedNote,
    pressed: &[Rc<Key>],
    all_keys: &[Rc<Key>],
) {
    let mut previous: Option<(usize, &Key)> = None;
    for key in pressed {
        let Some(pos) = all_keys.iter().position(|k| k.name == key.name) else {
            err.record(Issue::KeyOutOfOrder, &[note, &key.name, &"not in all"]);
            return;
        };
        if let Some((prev_pos, prev)) = previous {
            if pos <= prev_pos {
                err.record(
                    Issue::KeyOutOfOrder,
                    &[note, &key.name, &format!("after {}", prev.name)],
                );
                return;
            }
        }
        previous = Some((pos, &**key));
    }
}

fn read_lowest_notes(err: &mut ErrorMaker, entries: &Table) -> BTreeMap<String, PitchedNote> {
    let mut lowest = BTreeMap::new();
    for (variant, value) in entries {
        let parsed = match value {
            Value::String(text) => PitchedNote::parse(text).map_err(|e| e.text),
            other => Err(other.to_string()),
        };
        match parsed {
            Ok(note) => {
                lowest.insert(variant.clone(), note);
            }
            Err(text) => err.record(Issue::InvalidNote, &[variant, &text]),
        }
    }
    lowest
}

fn read_metadata(err: &mut ErrorMaker, entries: &Table) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    for (name, value) in entries {
        match value {
            Value::String(s) => {
                metadata.insert(name.clone(), s.clone());
            }
            other => err.record(Issue::InvalidMetadata, &[name, other]),
        }
    }
    metadata
}

//! Note names: parses spellings like `"C#4"`, `"Db_5"` or `"B♭3"` into a
//! [`PitchedNote`] that compares by pitch.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Semitone offset of every accepted spelling within an octave.
const NOTE_TO_OFFSET: [(&str, i32); 17] = [
    ("C", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
];

/// Characters dropped from a note name before it is read.
const SEPARATORS: [char; 3] = ['_', '-', ' '];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid note name: '{text}'")]
pub struct InvalidNoteError {
    /// The text as it was given, before normalization.
    pub text: String,
}

/// Semitone offset of a letter class, e.g. `offset("Eb") == Some(3)`.
pub fn offset(letter: &str) -> Option<i32> {
    NOTE_TO_OFFSET
        .iter()
        .find(|(name, _)| *name == letter)
        .map(|&(_, off)| off)
}

/// A note name resolved to a pitch.
///
/// Equality, hashing and ordering only look at [`pitch_number`], so
/// enharmonic spellings (`C#4`, `Db4`) are the same note.
///
/// [`pitch_number`]: PitchedNote::pitch_number
#[derive(Debug, Clone)]
pub struct PitchedNote {
    name: String,
    letter: String,
    octave: i32,
    pitch_number: i32,
}

impl PitchedNote {
    pub fn parse(text: &str) -> Result<Self, InvalidNoteError> {
        let invalid = || InvalidNoteError {
            text: text.to_string(),
        };

        let name: String = text
            .chars()
            .filter(|c| !SEPARATORS.contains(c))
            .map(|c| match c {
                '♭' => 'b',
                '♯' => '#',
                c => c,
            })
            .collect();

        let mut chars = name.char_indices();
        chars.next().ok_or_else(invalid)?;
        let split = match chars.next() {
            Some((i, c)) if c.is_ascii_digit() => i,
            Some((i, c)) => i + c.len_utf8(),
            None => return Err(invalid()),
        };
        let (letter, rest) = name.split_at(split);

        let off = offset(letter).ok_or_else(invalid)?;
        let octave: i32 = rest.parse().map_err(|_| invalid())?;
        let pitch_number = octave
            .checked_mul(12)
            .and_then(|p| p.checked_add(off))
            .ok_or_else(invalid)?;

        Ok(Self {
            letter: letter.to_string(),
            pitch_number,
            octave,
            name,
        })
    }

    /// Normalized spelling, separators removed.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn letter(&self) -> &str {
        &self.letter
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// `12 * octave + offset(letter)`.
    pub fn pitch_number(&self) -> i32 {
        self.pitch_number
    }
}

impl FromStr for PitchedNote {
    type Err = InvalidNoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for PitchedNote {
    fn eq(&self, other: &Self) -> bool {
        self.pitch_number == other.pitch_number
    }
}

impl Eq for PitchedNote {}

impl Hash for PitchedNote {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pitch_number.hash(state);
    }
}

impl PartialOrd for PitchedNote {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PitchedNote {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pitch_number.cmp(&other.pitch_number)
    }
}

impl fmt::Display for PitchedNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for PitchedNote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_twelve_pitch_classes() {
        let mut offsets: Vec<i32> = NOTE_TO_OFFSET.iter().map(|&(_, o)| o).collect();
        offsets.sort();
        offsets.dedup();
        assert_eq!(offsets, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn parses_letter_and_octave() {
        let n = PitchedNote::parse("Eb5").unwrap();
        assert_eq!(n.letter(), "Eb");
        assert_eq!(n.octave(), 5);
        assert_eq!(n.pitch_number(), 63);
        assert_eq!(n.to_string(), "Eb5");
    }

    #[test]
    fn separators_are_dropped_from_the_name() {
        let n = PitchedNote::parse("F#_ 4").unwrap();
        assert_eq!(n.name(), "F#4");
    }

    #[test]
    fn unicode_accidentals_normalize() {
        assert_eq!(PitchedNote::parse("B♭3").unwrap().letter(), "Bb");
        assert_eq!(PitchedNote::parse("G♯3").unwrap().letter(), "G#");
    }

    #[test]
    fn multi_digit_octaves() {
        assert_eq!(PitchedNote::parse("C10").unwrap().pitch_number(), 120);
    }

    #[test]
    fn rejects_octave_past_pitch_range() {
        let e = PitchedNote::parse("C999999999").unwrap_err();
        assert_eq!(e.text, "C999999999");
        assert!(PitchedNote::parse("B178956970").is_err());
        assert_eq!(PitchedNote::parse("C178956970").unwrap().pitch_number(), 2147483640);
    }

    #[test]
    fn rejects_missing_octave() {
        for text in ["", "C", "C#", "Db_", "G x"] {
            let e = PitchedNote::parse(text).unwrap_err();
            assert_eq!(e.text, text);
        }
    }
}

//! Note name parsing tests.

use std::collections::HashSet;

use fingerlib::PitchedNote;
use pretty_assertions::assert_eq;

fn note(text: &str) -> PitchedNote {
    text.parse().unwrap()
}

#[test]
fn spellings_of_one_pitch_are_equal() {
    let spellings = ["C#4", "Db4", "C#_4", "C #4", "D♭4", "C♯-4"];
    for s in spellings {
        assert_eq!(note(s), note("C#4"), "{s}");
        assert_eq!(note(s).pitch_number(), 49);
    }
    let distinct: HashSet<PitchedNote> = spellings.iter().map(|s| note(s)).collect();
    assert_eq!(distinct.len(), 1);
}

#[test]
fn name_keeps_the_spelling_without_separators() {
    assert_eq!(note("Db_4").name(), "Db4");
    assert_eq!(note("Db_4").to_string(), "Db4");
    assert_eq!(note("C #4").name(), "C#4");
}

#[test]
fn ordering_is_by_pitch() {
    let mut notes: Vec<PitchedNote> = ["C5", "B4", "Cb5", "A#4", "C4"]
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();
    notes.sort();
    let names: Vec<&str> = notes.iter().map(|n| n.name()).collect();
    assert_eq!(names, ["C4", "A#4", "B4", "C5"]);
}

#[test]
fn octave_boundaries() {
    assert_eq!(note("B3").pitch_number() + 1, note("C4").pitch_number());
    assert_eq!(note("C0").pitch_number(), 0);
}

#[test]
fn invalid_names_keep_the_original_text() {
    for text in ["H4", "Cb5", "C", "4", "C#x", "c4"] {
        let err = text.parse::<PitchedNote>().unwrap_err();
        assert_eq!(err.text, text);
        assert_eq!(err.to_string(), format!("invalid note name: '{text}'"));
    }
}

#[test]
fn serializes_as_its_name() {
    assert_eq!(serde_json::to_string(&note("F#_5")).unwrap(), "\"F#5\"");
}

//! fingerlib: fingering chart model builder and SVG renderer.
//!
//! A fingering document says which keys are pressed for each note; a layout
//! document says how to draw each key. Both are validated in full, reporting
//! every problem at once, before anything is drawn.
//!
//! # Example
//! ```no_run
//! use fingerlib::{load_fingering_file, load_layout_file, render_chart, PitchedNote};
//! use fingerlib::{FingeringOptions, LayoutOptions};
//!
//! let system = load_fingering_file("recorder.toml", &FingeringOptions::default()).unwrap();
//! let layout = load_layout_file("recorder.layout.toml", &system, &LayoutOptions::default()).unwrap();
//! let note: PitchedNote = "C5".parse().unwrap();
//! let svg = render_chart(&system, &layout, &note).unwrap();
//! println!("{svg}");
//! ```

pub mod errors;
pub mod fingering;
pub mod layout;
pub mod markup;
pub mod model;
pub mod note;
pub mod renderer;
pub mod spec;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use errors::{BuildError, ErrorMaker, Issue, UnexpectedPolicy, ValidationError};
pub use fingering::{FingeringOptions, InvalidKeyError};
pub use layout::LayoutOptions;
pub use model::*;
pub use note::{InvalidNoteError, PitchedNote};
pub use renderer::{pressed_names, render_all, render_chart, render_svg};
pub use spec::{FingeringSpec, LayoutSpec};

/// Why a document could not be turned into a model.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl LoadError {
    /// The validation problems, if that is why loading failed.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            LoadError::Build(e) => e.as_validation(),
            _ => None,
        }
    }
}

impl From<ValidationError> for LoadError {
    fn from(e: ValidationError) -> Self {
        LoadError::Build(BuildError::Validation(e))
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse and validate a fingering document from TOML text.
pub fn parse_fingering_str(
    text: &str,
    options: &FingeringOptions,
) -> Result<FingeringSystem, LoadError> {
    let doc: toml::Table = toml::from_str(text)?;
    let spec = FingeringSpec::from_document(&doc)?;
    Ok(fingering::build(&spec, options)?)
}

/// Parse and validate a fingering document from a file path.
pub fn load_fingering_file<P: AsRef<Path>>(
    path: P,
    options: &FingeringOptions,
) -> Result<FingeringSystem, LoadError> {
    parse_fingering_str(&read(path.as_ref())?, options)
}

/// Parse and validate a layout document from TOML text.
///
/// `valid_names` is usually the [`FingeringSystem`] the layout draws.
pub fn parse_layout_str<N: KeyNames + ?Sized>(
    text: &str,
    valid_names: &N,
    options: &LayoutOptions,
) -> Result<Layout, LoadError> {
    let doc: toml::Table = toml::from_str(text)?;
    let spec = LayoutSpec::from_document(&doc)?;
    Ok(layout::build(&spec, valid_names, options)?)
}

/// Parse and validate a layout document from a file path.
pub fn load_layout_file<P: AsRef<Path>, N: KeyNames + ?Sized>(
    path: P,
    valid_names: &N,
    options: &LayoutOptions,
) -> Result<Layout, LoadError> {
    parse_layout_str(&read(path.as_ref())?, valid_names, options)
}

/// Convert a fingering system to a JSON string.
pub fn fingering_system_to_json(system: &FingeringSystem) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(system)
}

/// Convert a layout to a JSON string.
pub fn layout_to_json(layout: &Layout) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(layout)
}

//! Error aggregation for validation passes.
//!
//! A builder walks a whole document and records every problem it finds under
//! a short label instead of stopping at the first one. At the end of the pass
//! the [`ErrorMaker`] either hands back the built value or a single
//! [`ValidationError`] listing every label with its details.

use std::fmt;

use thiserror::Error;

/// Joins the detail arguments of a single recorded entry.
const DETAIL_JOINER: &str = ": ";

/// Labels recorded by the builders.
///
/// Each variant maps to the user-visible label printed at the start of a
/// line in a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Issue {
    // ── Document shape ─────────────────────────────────────────────
    NotATable,
    UnknownField,
    MissingField,
    InvalidValue,

    // ── Fingering document ─────────────────────────────────────────
    InvalidKey,
    DuplicateShortName,
    InvalidFingering,
    DuplicateKeyInFingering,
    UnknownKey,
    InvalidNote,
    DuplicateNote,
    KeyOutOfOrder,
    InvalidMetadata,

    // ── Layout document ────────────────────────────────────────────
    BadMarkup,
    MissingParts,
    UnknownPieceName,
    MissingOffPart,
    UnknownDefinition,

    Unexpected,
}

impl Issue {
    pub fn label(self) -> &'static str {
        match self {
            Issue::NotATable => "Not a table",
            Issue::UnknownField => "Unknown arg",
            Issue::MissingField => "Missing arg",
            Issue::InvalidValue => "Invalid value",
            Issue::InvalidKey => "Invalid key",
            Issue::DuplicateShortName => "Duplicate short_name",
            Issue::InvalidFingering => "Invalid fingering",
            Issue::DuplicateKeyInFingering => "Duplicate keys in fingering",
            Issue::UnknownKey => "Unknown key",
            Issue::InvalidNote => "Invalid note",
            Issue::DuplicateNote => "Duplicate note",
            Issue::KeyOutOfOrder => "Key out of order",
            Issue::InvalidMetadata => "Invalid metadata",
            Issue::BadMarkup => "Bad XML in def",
            Issue::MissingParts => "Missing parts section",
            Issue::UnknownPieceName => "Unknown key name",
            Issue::MissingOffPart => "Missing parts.off section",
            Issue::UnknownDefinition => "Unknown def in parts",
            Issue::Unexpected => "Unexpected exception",
        }
    }
}

impl AsRef<str> for Issue {
    fn as_ref(&self) -> &str {
        self.label()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every problem found during one validation pass, grouped by label in the
/// order the labels were first recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    entries: Vec<(String, Vec<String>)>,
}

impl ValidationError {
    /// All `(label, details)` groups in recording order.
    pub fn entries(&self) -> &[(String, Vec<String>)] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Details recorded under `label`, or an empty slice.
    pub fn details(&self, label: impl AsRef<str>) -> &[String] {
        let label = label.as_ref();
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, details)| details.as_slice())
            .unwrap_or(&[])
    }

    pub fn has(&self, label: impl AsRef<str>) -> bool {
        !self.details(label).is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (label, details)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{label}: {}", details.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Why a build did not produce a value.
///
/// `Validation` is the normal outcome for a bad document. `Unexpected`
/// covers failures that are not about the document at all.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("unexpected failure: {0}")]
    Unexpected(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BuildError {
    pub fn unexpected(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        BuildError::Unexpected(err.into())
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            BuildError::Validation(e) => Some(e),
            BuildError::Unexpected(_) => None,
        }
    }
}

/// What [`ErrorMaker::scope`] does with a [`BuildError::Unexpected`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnexpectedPolicy {
    /// Return the unexpected error unchanged.
    #[default]
    Propagate,
    /// Record it under "Unexpected exception" alongside the other problems.
    Record,
}

/// Accumulates labeled problems over one validation pass.
#[derive(Debug, Default)]
pub struct ErrorMaker {
    errors: Vec<(String, Vec<String>)>,
    policy: UnexpectedPolicy,
}

impl ErrorMaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: UnexpectedPolicy) -> Self {
        Self {
            errors: Vec::new(),
            policy,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record one entry under `label`, built by joining `details`.
    pub fn record(&mut self, label: impl AsRef<str>, details: &[&dyn fmt::Display]) {
        let msg = details
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(DETAIL_JOINER);
        let label = label.as_ref();
        match self.errors.iter_mut().find(|(l, _)| l == label) {
            Some((_, entries)) => entries.push(msg),
            None => self.errors.push((label.to_string(), vec![msg])),
        }
    }

    /// Record the values that occur more than once in `items`.
    ///
    /// Returns `true` when there were no duplicates.
    pub fn record_duplicates<I>(
        &mut self,
        label: impl AsRef<str>,
        items: I,
        context: &[&dyn fmt::Display],
    ) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for item in items {
            let item = item.as_ref();
            match counts.iter_mut().find(|(name, _)| name == item) {
                Some((_, n)) => *n += 1,
                None => counts.push((item.to_string(), 1)),
            }
        }
        let dupes: Vec<&String> = counts
            .iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name)
            .collect();
        if dupes.is_empty() {
            return true;
        }

        let mut details: Vec<&dyn fmt::Display> =
            dupes.iter().map(|d| *d as &dyn fmt::Display).collect();
        details.extend_from_slice(context);
        self.record(label, &details);
        false
    }

    /// Fail if anything has been recorded.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                entries: self.errors.clone(),
            })
        }
    }

    /// Record and return the aggregated error, for problems that make the
    /// rest of the pass pointless.
    pub fn fail(&mut self, label: impl AsRef<str>, details: &[&dyn fmt::Display]) -> ValidationError {
        self.record(label, details);
        ValidationError {
            entries: self.errors.clone(),
        }
    }

    /// Run one validation pass and finalize it.
    ///
    /// A successful body still fails if anything was recorded along the way.
    pub fn scope<T, F>(mut self, body: F) -> Result<T, BuildError>
    where
        F: FnOnce(&mut ErrorMaker) -> Result<T, BuildError>,
    {
        match body(&mut self) {
            Ok(value) => {
                self.check()?;
                Ok(value)
            }
            Err(BuildError::Validation(e)) => Err(BuildError::Validation(e)),
            Err(BuildError::Unexpected(e)) => match self.policy {
                UnexpectedPolicy::Propagate => Err(BuildError::Unexpected(e)),
                UnexpectedPolicy::Record => {
                    self.record(Issue::Unexpected, &[&e]);
                    Err(self.fail_with_recorded())
                }
            },
        }
    }

    fn fail_with_recorded(&self) -> BuildError {
        BuildError::Validation(ValidationError {
            entries: self.errors.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_joins_details_and_groups_by_label() {
        let mut err = ErrorMaker::new();
        err.record("Bad", &[&"a", &1]);
        err.record("Other", &[&"x"]);
        err.record("Bad", &[&"b"]);

        let e = err.check().unwrap_err();
        assert_eq!(e.details("Bad"), ["a: 1", "b"]);
        assert_eq!(e.to_string(), "Bad: a: 1, b\nOther: x");
    }

    #[test]
    fn empty_maker_checks_clean() {
        assert!(ErrorMaker::new().check().is_ok());
    }

    #[test]
    fn duplicates_are_reported_once_in_first_seen_order() {
        let mut err = ErrorMaker::new();
        assert!(err.record_duplicates("Dupes", ["a", "b", "c"], &[]));
        assert!(!err.record_duplicates("Dupes", ["b", "a", "b", "a", "b"], &[&"C4"]));

        let e = err.check().unwrap_err();
        assert_eq!(e.details("Dupes"), ["b: a: C4"]);
    }

    #[test]
    fn fail_includes_earlier_entries() {
        let mut err = ErrorMaker::new();
        err.record(Issue::InvalidKey, &[&"K"]);
        let e = err.fail(Issue::NotATable, &[]);
        assert!(e.has(Issue::InvalidKey));
        assert_eq!(e.labels().collect::<Vec<_>>(), ["Invalid key", "Not a table"]);
    }

    #[test]
    fn scope_fails_on_recorded_entries() {
        let result = ErrorMaker::new().scope(|err| {
            err.record("Late", &[&"problem"]);
            Ok(5)
        });
        let e = result.unwrap_err();
        assert!(e.as_validation().unwrap().has("Late"));
    }

    #[test]
    fn scope_propagates_unexpected_by_default() {
        let result: Result<(), _> =
            ErrorMaker::new().scope(|_| Err(BuildError::unexpected("boom")));
        assert!(matches!(result, Err(BuildError::Unexpected(_))));
    }

    #[test]
    fn scope_can_record_unexpected() {
        let result: Result<(), _> = ErrorMaker::with_policy(UnexpectedPolicy::Record).scope(|err| {
            err.record("First", &[&"one"]);
            Err(BuildError::unexpected("boom"))
        });
        let e = result.unwrap_err();
        let v = e.as_validation().unwrap();
        assert_eq!(v.details("First"), ["one"]);
        assert_eq!(v.details(Issue::Unexpected), ["boom"]);
    }
}

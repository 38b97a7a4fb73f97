//! Shared constants for the chart renderer (all in SVG user units).

pub(super) const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

// ── Label ───────────────────────────────────────────────────────────
pub(super) const LABEL_X: i64 = 40;
pub(super) const LABEL_BASELINE_OFFSET: i64 = 20; // below the last row
pub(super) const LABEL_FONT_SIZE: i64 = 60;

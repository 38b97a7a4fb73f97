//! Chart renderer: draws a [`Layout`] with a set of pressed keys as SVG.
//!
//! The layout is trusted: it has been validated by the layout builder, so
//! rendering never fails. Output is deterministic for the same inputs.

mod constants;
mod svg_builder;

use std::collections::HashSet;

use crate::markup::Element;
use crate::model::{ChartPiece, FingeringSystem, Layout};
use crate::note::PitchedNote;
use constants::*;
use svg_builder::SvgBuilder;

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Render `layout` with the keys named in `pressed` held down.
///
/// Each piece shows the variant for the first name in `pressed` it has one
/// for, and its off state otherwise. `label` is written under the chart.
pub fn render_svg<S: AsRef<str>>(layout: &Layout, pressed: &[S], label: &str) -> String {
    let (width, height) = layout.size;
    let mut svg = SvgBuilder::new(width, height);

    svg.style(&layout.style);

    let mut seen = HashSet::new();
    svg.defs(
        layout
            .defs
            .iter()
            .filter(|d| seen.insert(d.id.as_str()))
            .map(|d| &d.element),
    );

    svg.group(layout.pieces.iter().map(|p| render_piece(p, pressed)).collect());

    let label_y = height
        .saturating_sub(layout.spacing)
        .saturating_add(LABEL_BASELINE_OFFSET);
    svg.label(LABEL_X, label_y, label);
    svg.build()
}

/// Names that select a pressed variant for `note`: each key's declared name
/// followed by its short name. `None` if the note has no fingering.
pub fn pressed_names(system: &FingeringSystem, note: &PitchedNote) -> Option<Vec<String>> {
    let keys = system.fingering(note)?;
    let mut names = Vec::new();
    for key in keys {
        names.push(key.name.clone());
        if let Some(short) = &key.short_name {
            names.push(short.clone());
        }
    }
    Some(names)
}

/// Render the chart for one note, labelled with the note name.
pub fn render_chart(
    system: &FingeringSystem,
    layout: &Layout,
    note: &PitchedNote,
) -> Option<String> {
    let names = pressed_names(system, note)?;
    Some(render_svg(layout, &names, note.name()))
}

/// Render every fingering in the system, lowest note first.
pub fn render_all(system: &FingeringSystem, layout: &Layout) -> Vec<(PitchedNote, String)> {
    system
        .fingerings
        .keys()
        .filter_map(|note| Some((note.clone(), render_chart(system, layout, note)?)))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Pieces
// ═══════════════════════════════════════════════════════════════════════

fn render_piece<S: AsRef<str>>(piece: &ChartPiece, pressed: &[S]) -> Element {
    let mut uses: Vec<Element> = piece
        .select(pressed)
        .iter()
        .map(|part| {
            let mut el = Element::new("use")
                .with_attr("x", piece.x.to_string())
                .with_attr("y", piece.y.to_string())
                .with_attr("href", format!("#{}", part.def_id));
            if !part.style.is_empty() {
                el.set("class", part.style.as_str());
            }
            el
        })
        .collect();

    if uses.len() == 1 {
        return uses.remove(0);
    }
    let mut g = Element::new("g");
    for el in uses {
        g.push(el);
    }
    g
}

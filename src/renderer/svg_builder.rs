//! SVG builder: accumulates top-level SVG elements and produces the final
//! string.

use super::constants::*;
use crate::markup::{escape_text, Element};

pub(super) struct SvgBuilder {
    pub(super) elements: Vec<String>,
    width: i64,
    height: i64,
}

impl SvgBuilder {
    pub(super) fn new(width: i64, height: i64) -> Self {
        Self {
            elements: Vec::new(),
            width,
            height,
        }
    }

    pub(super) fn build(self) -> String {
        let mut svg = format!(
            r#"<svg viewBox="0 0 {} {}" xmlns="{}">"#,
            self.width, self.height, SVG_NAMESPACE
        );
        svg.push('\n');
        for el in &self.elements {
            svg.push_str("  ");
            svg.push_str(el);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }

    pub(super) fn style(&mut self, css: &str) {
        // CSS goes out verbatim; only a literal `]]>` needs splitting.
        let css = css.replace("]]>", "]]]]><![CDATA[>");
        self.elements
            .push(format!("<style><![CDATA[{css}]]></style>"));
    }

    pub(super) fn defs<'a>(&mut self, defs: impl IntoIterator<Item = &'a Element>) {
        let mut out = String::from("<defs>");
        for def in defs {
            def.write_to(&mut out);
        }
        out.push_str("</defs>");
        self.elements.push(out);
    }

    pub(super) fn group(&mut self, children: Vec<Element>) {
        let mut g = Element::new("g");
        for child in children {
            g.push(child);
        }
        self.elements.push(g.to_markup());
    }

    pub(super) fn label(&mut self, x: i64, y: i64, content: &str) {
        self.elements.push(format!(
            r#"<text x="{}" y="{}" font-size="{}">{}</text>"#,
            x,
            y,
            LABEL_FONT_SIZE,
            escape_text(content)
        ));
    }
}

//! Fixed-layout A4 report generators. Each generator takes plain data rows
//! and returns the rendered document as bytes.

pub mod emergency;
pub mod maintenance;
pub mod work_order;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use thiserror::Error;

const PAGE_W: f64 = 210.0;
const PAGE_H: f64 = 297.0;
const MARGIN: f64 = 18.0;
const BOTTOM_MARGIN: f64 = 20.0;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("record not found")]
    NotFound,
    #[error("pdf rendering error: {0}")]
    Render(#[from] printpdf::Error),
}

pub(crate) struct Fonts {
    pub regular: IndirectFontRef,
    pub bold: IndirectFontRef,
}

/// Cursor-based writer over one page layer. Y runs downward from the top
/// margin; `ensure_room` starts a new page when the cursor would cross the
/// bottom margin.
pub(crate) struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: f64,
}

impl PageWriter {
    pub fn new_a4(title: &str) -> Result<(Self, Fonts), PdfError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_W as f32), Mm(PAGE_H as f32), "Layer 1");
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
        };
        let layer = doc.get_page(page).get_layer(layer);
        Ok((
            Self {
                doc,
                layer,
                y: PAGE_H - MARGIN,
            },
            fonts,
        ))
    }

    pub fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_W as f32), Mm(PAGE_H as f32), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_H - MARGIN;
    }

    pub fn ensure_room(&mut self, height: f64) {
        if self.y - height < BOTTOM_MARGIN {
            self.new_page();
        }
    }

    pub fn text(&self, text: &str, size: f64, x: f64, font: &IndirectFontRef) {
        self.layer
            .use_text(text, size as f32, Mm(x as f32), Mm(self.y as f32), font);
    }

    pub fn advance(&mut self, dy: f64) {
        self.y -= dy;
    }

    /// Horizontal rule across the content width.
    pub fn rule(&self, thickness: f64) {
        self.layer.set_outline_thickness(thickness as f32);
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.2, 0.2, 0.2, None)));
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN as f32), Mm(self.y as f32)), false),
                (
                    Point::new(Mm((PAGE_W - MARGIN) as f32), Mm(self.y as f32)),
                    false,
                ),
            ],
            is_closed: false,
        });
    }

    /// Title band: bold heading with a heavy rule underneath.
    pub fn heading(&mut self, title: &str, subtitle: &str, fonts: &Fonts) {
        self.text(title, 16.0, MARGIN, &fonts.bold);
        self.advance(6.0);
        self.text(subtitle, 9.0, MARGIN, &fonts.regular);
        self.advance(3.0);
        self.rule(1.2);
        self.advance(8.0);
    }

    /// Two-column label/value row of the general-info table.
    pub fn info_row(&mut self, label: &str, value: &str, fonts: &Fonts) {
        self.ensure_room(6.0);
        self.text(label, 9.0, MARGIN, &fonts.bold);
        self.text(value, 9.0, MARGIN + 45.0, &fonts.regular);
        self.advance(6.0);
    }

    pub fn section(&mut self, title: &str, fonts: &Fonts) {
        self.ensure_room(12.0);
        self.advance(4.0);
        self.text(title, 11.0, MARGIN, &fonts.bold);
        self.advance(2.0);
        self.rule(0.4);
        self.advance(6.0);
    }

    /// Body text wrapped to the content width.
    pub fn paragraph(&mut self, body: &str, fonts: &Fonts) {
        for line in wrap_text(body, 95) {
            self.ensure_room(5.0);
            self.text(&line, 9.0, MARGIN, &fonts.regular);
            self.advance(5.0);
        }
    }

    /// Signature block: rule with the signer's name and a caption under it.
    pub fn signature_block(&mut self, name: &str, caption: &str, fonts: &Fonts) {
        self.ensure_room(30.0);
        self.advance(18.0);
        self.rule(0.4);
        self.advance(5.0);
        self.text(name, 9.0, MARGIN, &fonts.regular);
        self.advance(5.0);
        self.text(caption, 8.0, MARGIN, &fonts.regular);
        self.advance(5.0);
    }

    pub fn finish(self) -> Result<Vec<u8>, PdfError> {
        Ok(self.doc.save_to_bytes()?)
    }
}

pub(crate) fn margin() -> f64 {
    MARGIN
}

/// Greedy word wrap by character count. Helvetica at 9pt fits roughly 95
/// characters in the content width. Words longer than `max_chars` are
/// hard-broken so serials and URLs cannot overflow narrow columns.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;
        for word in raw_line.split_whitespace() {
            for chunk in break_word(word, max_chars) {
                let chunk_len = chunk.chars().count();
                if current_len == 0 {
                    current = chunk.to_string();
                    current_len = chunk_len;
                } else if current_len + 1 + chunk_len <= max_chars {
                    current.push(' ');
                    current.push_str(chunk);
                    current_len += 1 + chunk_len;
                } else {
                    lines.push(std::mem::take(&mut current));
                    current = chunk.to_string();
                    current_len = chunk_len;
                }
            }
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Splits a word into `max_chars`-sized pieces at char boundaries.
fn break_word(word: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = word;
    loop {
        match rest.char_indices().nth(max_chars) {
            Some((split, _)) => {
                let (head, tail) = rest.split_at(split);
                chunks.push(head);
                rest = tail;
            }
            None => {
                chunks.push(rest);
                return chunks;
            }
        }
    }
}

/// Chilean peso formatting: `$1.234.567`.
pub(crate) fn format_clp(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_long_text() {
        let text = "one two three four five six seven eight nine ten";
        let lines = wrap_text(text, 20);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 20));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn hard_breaks_words_wider_than_the_column() {
        let text = "serial KONE-MX10-2026-0001-REV-B installed";
        let lines = wrap_text(text, 18);
        assert!(lines.iter().all(|l| l.chars().count() <= 18));
        assert_eq!(lines.concat().replace(' ', ""), text.replace(' ', ""));

        // A single unbroken token still fits the column.
        let lines = wrap_text("0123456789012345678901234", 18);
        assert_eq!(lines, vec!["012345678901234567", "8901234"]);
    }

    #[test]
    fn preserves_explicit_newlines() {
        let lines = wrap_text("first\nsecond", 80);
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn clp_grouping() {
        assert_eq!(format_clp(0), "$0");
        assert_eq!(format_clp(950), "$950");
        assert_eq!(format_clp(1234567), "$1.234.567");
        assert_eq!(format_clp(-4500), "-$4.500");
    }
}

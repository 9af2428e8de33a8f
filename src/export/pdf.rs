//! # PDF Export Module
//!
//! Renders extracted text into a US Letter PDF with `lopdf`. Text is set
//! in Helvetica 12 and word-wrapped at a 450 pt line width using the
//! font's AFM advance widths, so pagination is deterministic for a
//! given input.

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::config::PdfLayout;
use crate::errors::{AppError, AppResult};

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const FONT_SIZE: i64 = 12;
const MARGIN_X: i64 = 50;
const LINE_STEP: i64 = 15;
/// New page when the cursor would fall below this.
const BOTTOM_MARGIN: i64 = 50;
const PLAIN_START_Y: i64 = 750;
const HEADED_BODY_START_Y: i64 = 760;
const CONTINUATION_START_Y: i64 = 750;
const HEADER_FILE_Y: i64 = 800;
const HEADER_TIME_Y: i64 = 780;
const HEADER_RULE_Y: i64 = 775;
const HEADER_RULE_END_X: i64 = 562;

/// Maximum rendered line width in points.
pub const WRAP_WIDTH: f32 = 450.0;

/// Helvetica advance widths in 1/1000 em for ASCII 32..=126, from the
/// Adobe AFM. Code points outside the table fall back to 556.
const HELVETICA_WIDTHS: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

fn char_width(c: char) -> f32 {
    let code = c as u32;
    if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[(code - 32) as usize] as f32
    } else {
        556.0
    }
}

/// Rendered width in points of `text` at Helvetica 12.
pub fn line_width_pt(text: &str) -> f32 {
    text.chars().map(char_width).sum::<f32>() * FONT_SIZE as f32 / 1000.0
}

/// Word-wraps text at the 450 pt wrap width.
///
/// Each paragraph (text between original newlines) is wrapped
/// independently: words accumulate onto a line as long as the line plus
/// the next word measures under the wrap width, then the line flushes.
/// Emitted lines keep one trailing space per word; paragraphs with no
/// words produce no lines. A single word wider than the wrap width is
/// placed on its own line rather than split.
pub fn wrap_text(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = format!("{}{}", line, word);
            if line_width_pt(&candidate) >= WRAP_WIDTH {
                lines.push(std::mem::take(&mut line));
            }
            line.push_str(word);
            line.push(' ');
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Folds a line to the single-byte encoding a Type1 Helvetica stream
/// expects; anything above U+00FF becomes `?`.
fn encode_pdf_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

fn text_ops(line: &str, x: i64, y: i64) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(encode_pdf_text(line))]),
        Operation::new("ET", vec![]),
    ]
}

/// First-page header: filename, extraction timestamp, separator rule.
fn header_ops(filename: &str, processed_at: DateTime<Utc>) -> Vec<Operation> {
    let timestamp = processed_at.format("%Y-%m-%d %H:%M:%S");
    let mut ops = text_ops(&format!("File: {}", filename), MARGIN_X, HEADER_FILE_Y);
    ops.extend(text_ops(
        &format!("Extracted: {}", timestamp),
        MARGIN_X,
        HEADER_TIME_Y,
    ));
    ops.push(Operation::new(
        "m",
        vec![MARGIN_X.into(), HEADER_RULE_Y.into()],
    ));
    ops.push(Operation::new(
        "l",
        vec![HEADER_RULE_END_X.into(), HEADER_RULE_Y.into()],
    ));
    ops.push(Operation::new("S", vec![]));
    ops
}

/// Assembles the PDF document.
///
/// The `Headed` layout draws the header block on the first page only
/// and starts the body at y = 760; `Plain` starts at y = 750. Lines
/// step down 15 pt and overflow onto fresh pages at y = 750.
pub fn render(
    text: &str,
    filename: &str,
    processed_at: DateTime<Utc>,
    layout: PdfLayout,
) -> AppResult<Vec<u8>> {
    let lines = wrap_text(text);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_batches: Vec<Vec<Operation>> = Vec::new();
    let mut ops: Vec<Operation> = Vec::new();
    let mut y = match layout {
        PdfLayout::Plain => PLAIN_START_Y,
        PdfLayout::Headed => {
            ops.extend(header_ops(filename, processed_at));
            HEADED_BODY_START_Y
        }
    };

    for line in &lines {
        if y < BOTTOM_MARGIN {
            page_batches.push(std::mem::take(&mut ops));
            y = CONTINUATION_START_Y;
        }
        ops.extend(text_ops(line, MARGIN_X, y));
        y -= LINE_STEP;
    }
    page_batches.push(ops);

    let mut kids: Vec<Object> = Vec::new();
    for batch in page_batches {
        let content = Content { operations: batch };
        let encoded = content.encode().map_err(|e| {
            AppError::Export(format!("Failed to encode PDF content stream: {}", e))
        })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| AppError::Export(format!("Failed to serialize PDF document: {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_width_of_digits() {
        // Digits are all 556/1000 em wide.
        let width = line_width_pt("12345");
        assert!((width - 5.0 * 556.0 * 12.0 / 1000.0).abs() < 0.001);
    }

    #[test]
    fn test_wrap_short_text_single_line() {
        let lines = wrap_text("Hello world");
        assert_eq!(lines, vec!["Hello world "]);
    }

    #[test]
    fn test_wrap_empty_text_no_lines() {
        assert!(wrap_text("").is_empty());
        assert!(wrap_text("\n\n").is_empty());
    }

    #[test]
    fn test_wrap_long_paragraph_flushes_at_wrap_width() {
        let text = "Hello world\nThis is a long line of text that should wrap across \
                    the page width boundary for testing purposes here";
        let lines = wrap_text(text);

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Hello world ");
        assert!(lines[1].starts_with("This is"));
        assert!(lines[2].starts_with("purposes"));
        for line in &lines {
            // A flushed line may carry its trailing space past the wrap
            // width, but never more than one space width over it.
            assert!(line_width_pt(line) < 454.0, "line too wide: {:?}", line);
        }
    }

    #[test]
    fn test_wrap_preserves_word_order() {
        let text = "one two three\nfour five";
        let joined: Vec<String> = wrap_text(text)
            .iter()
            .flat_map(|l| l.split_whitespace().map(str::to_string))
            .collect();
        assert_eq!(joined, vec!["one", "two", "three", "four", "five"]);
    }

    #[test]
    fn test_wrap_is_deterministic() {
        let text = "Repeatable layout depends on fixed font metrics";
        assert_eq!(wrap_text(text), wrap_text(text));
    }

    #[test]
    fn test_encode_non_latin_falls_back() {
        assert_eq!(encode_pdf_text("a✓b"), b"a?b");
        assert_eq!(encode_pdf_text("caf\u{e9}"), b"caf\xe9");
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = render("Hello world", "scan.png", Utc::now(), PdfLayout::Plain).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }
}

//! # XML Export Module
//!
//! Streams extraction output through the `quick-xml` writer with
//! 2-space indentation. Both field-naming variants live under the same
//! `extracted_text` root; escaping is left to the writer.

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::FieldNaming;
use crate::errors::{AppError, AppResult};
use crate::text;

fn xml_error(e: impl std::fmt::Display) -> AppError {
    AppError::Export(format!("Failed to write XML export: {}", e))
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    value: &str,
) -> AppResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(tag)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(xml_error)?;
    Ok(())
}

/// Renders UTF-8 XML in the configured field naming.
pub fn render(
    text_content: &str,
    filename: &str,
    processed_at: DateTime<Utc>,
    naming: FieldNaming,
) -> AppResult<Vec<u8>> {
    let counts = text::counts(text_content);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("extracted_text")))
        .map_err(xml_error)?;

    match naming {
        FieldNaming::Compact => {
            write_text_element(&mut writer, "filename", filename)?;
            write_text_element(&mut writer, "text", text_content)?;
            write_text_element(&mut writer, "character_count", &counts.characters.to_string())?;
            write_text_element(&mut writer, "word_count", &counts.words.to_string())?;
            write_text_element(&mut writer, "line_count", &counts.lines.to_string())?;
        }
        FieldNaming::Verbose => {
            write_text_element(&mut writer, "filename", filename)?;
            write_text_element(&mut writer, "processed_at", &processed_at.to_rfc3339())?;
            write_text_element(&mut writer, "character_count", &counts.characters.to_string())?;
            write_text_element(&mut writer, "line_count", &counts.lines.to_string())?;
            write_text_element(&mut writer, "content", text_content)?;
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new("extracted_text")))
        .map_err(xml_error)?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quick_xml::Reader;

    fn render_str(text: &str, naming: FieldNaming) -> String {
        let when = Utc.with_ymd_and_hms(2024, 5, 12, 9, 30, 0).unwrap();
        String::from_utf8(render(text, "scan.png", when, naming).unwrap()).unwrap()
    }

    fn text_of(xml: &str, tag: &str) -> String {
        let mut reader = Reader::from_str(xml);
        let mut inside = false;
        let mut value = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) if e.name().as_ref() == tag.as_bytes() => inside = true,
                Event::End(e) if e.name().as_ref() == tag.as_bytes() => break,
                Event::Text(e) if inside => value.push_str(&e.unescape().unwrap()),
                Event::Eof => break,
                _ => {}
            }
        }
        value
    }

    #[test]
    fn test_compact_layout() {
        let output = render_str("Hello world\nsecond line", FieldNaming::Compact);

        assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(output.contains("<extracted_text>"));
        assert_eq!(text_of(&output, "filename"), "scan.png");
        assert_eq!(text_of(&output, "character_count"), "23");
        assert_eq!(text_of(&output, "word_count"), "4");
        assert_eq!(text_of(&output, "line_count"), "2");
        assert!(!output.contains("<content>"));
        assert!(!output.contains("<processed_at>"));
    }

    #[test]
    fn test_verbose_layout() {
        let output = render_str("Hello", FieldNaming::Verbose);

        assert_eq!(text_of(&output, "processed_at"), "2024-05-12T09:30:00+00:00");
        assert_eq!(text_of(&output, "content"), "Hello");
        assert!(!output.contains("<word_count>"));
        assert!(!output.contains("<text>"));
    }

    #[test]
    fn test_markup_in_text_is_escaped() {
        let output = render_str("a <b> & </b>", FieldNaming::Compact);
        assert!(output.contains("&lt;b&gt;"));
        assert!(output.contains("&amp;"));
        assert_eq!(text_of(&output, "text"), "a <b> & </b>");
    }

    #[test]
    fn test_multiline_text_round_trips() {
        let text = "first line\nsecond line\nthird";
        let output = render_str(text, FieldNaming::Verbose);
        assert_eq!(text_of(&output, "content"), text);
    }

    #[test]
    fn test_empty_text_counts() {
        let output = render_str("", FieldNaming::Compact);
        assert_eq!(text_of(&output, "character_count"), "0");
        assert_eq!(text_of(&output, "word_count"), "0");
        assert_eq!(text_of(&output, "line_count"), "1");
    }
}

//! # Export Tests Module
//!
//! Integration tests for the export layer: PDF layout and pagination
//! verified by parsing the emitted bytes, plus JSON/XML round trips
//! through the shared export entry point.

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use lopdf::Document;
    use tempfile::TempDir;
    use textgrab::config::{ExportConfig, FieldNaming, PdfLayout};
    use textgrab::export::{self, pdf, ExportFormat};
    use textgrab::storage::{LocalStorage, NamePattern};

    fn when() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 12, 9, 30, 0).unwrap()
    }

    /// Test that wrapped output fills pages at 47 lines and overflows
    #[test]
    fn test_pdf_paginates_at_page_capacity() {
        let text = (1..=100)
            .map(|i| format!("entry{:03}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let bytes = pdf::render(&text, "scan.png", when(), PdfLayout::Plain).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);

        let page1 = doc.extract_text(&[1]).unwrap();
        assert!(page1.contains("entry001"));
        assert!(page1.contains("entry047"));
        assert!(!page1.contains("entry048"));

        let page2 = doc.extract_text(&[2]).unwrap();
        assert!(page2.contains("entry048"));
        assert!(page2.contains("entry094"));

        let page3 = doc.extract_text(&[3]).unwrap();
        assert!(page3.contains("entry095"));
        assert!(page3.contains("entry100"));
    }

    /// Test that the headed layout draws its header on the first page only
    #[test]
    fn test_pdf_headed_layout_header_on_first_page() {
        let text = (1..=60)
            .map(|i| format!("entry{:03}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let bytes = pdf::render(&text, "scan.png", when(), PdfLayout::Headed).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        let page1 = doc.extract_text(&[1]).unwrap();
        assert!(page1.contains("File: scan.png"));
        assert!(page1.contains("Extracted: 2024-05-12 09:30:00"));
        // Headed first page starts lower and fits one extra line.
        assert!(page1.contains("entry048"));

        let page2 = doc.extract_text(&[2]).unwrap();
        assert!(!page2.contains("File:"));
        assert!(page2.contains("entry049"));
    }

    /// Test that long paragraphs wrap under the 450 pt line width
    #[test]
    fn test_pdf_wraps_long_paragraph() {
        let text = "Hello world\nThis is a long line of text that should wrap across \
                    the page width boundary for testing purposes here";
        let bytes = pdf::render(text, "scan.png", when(), PdfLayout::Plain).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        let content = doc.extract_text(&[1]).unwrap();
        assert!(content.contains("Hello world"));
        assert!(content.contains("purposes here"));

        for line in pdf::wrap_text(text) {
            assert!(pdf::line_width_pt(&line) < 454.0);
        }
    }

    /// Test that empty text still yields a one-page document
    #[test]
    fn test_pdf_empty_text_single_page() {
        let bytes = pdf::render("", "scan.png", when(), PdfLayout::Plain).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    /// Test that identical input renders identical structure
    #[test]
    fn test_pdf_render_is_deterministic() {
        let text = "Deterministic layout from fixed font metrics";
        let first = pdf::render(text, "scan.png", when(), PdfLayout::Plain).unwrap();
        let second = pdf::render(text, "scan.png", when(), PdfLayout::Plain).unwrap();

        let doc1 = Document::load_mem(&first).unwrap();
        let doc2 = Document::load_mem(&second).unwrap();
        assert_eq!(doc1.get_pages().len(), doc2.get_pages().len());
        assert_eq!(
            doc1.extract_text(&[1]).unwrap(),
            doc2.extract_text(&[1]).unwrap()
        );
    }

    /// Test the JSON artifact through the shared entry point
    #[test]
    fn test_json_artifact_compact() {
        let config = ExportConfig::default();
        let artifact = export::export(
            ExportFormat::Json,
            &config,
            "Olé ✓ text\nsecond",
            "scan.png",
            when(),
            None,
        )
        .unwrap();

        assert_eq!(artifact.mime_type, "application/json");
        assert_eq!(artifact.download_name, "scan.png.json");

        let value: serde_json::Value = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(value["text"], "Olé ✓ text\nsecond");
        assert_eq!(value["character_count"], 17);
        assert_eq!(value["line_count"], 2);
    }

    /// Test that verbose JSON embeds FileInfo read from storage
    #[test]
    fn test_json_verbose_with_file_info() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let img = image::GrayImage::from_pixel(32, 32, image::Luma([200u8]));
        let mut buffer = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        let filename = storage
            .save(&buffer.into_inner(), "scan.png", NamePattern::Prefixed)
            .unwrap();
        let info = storage.stat(&filename).unwrap();

        let config = ExportConfig {
            field_naming: FieldNaming::Verbose,
            ..ExportConfig::default()
        };
        let artifact = export::export(
            ExportFormat::Json,
            &config,
            "hello",
            &filename,
            when(),
            Some(&info),
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(value["extracted_text"], "hello");
        assert_eq!(value["file_info"]["dimensions"], "32x32");
        assert_eq!(value["file_info"]["file_type"], ".png");
    }

    /// Test the XML artifact through the shared entry point
    #[test]
    fn test_xml_artifact() {
        let config = ExportConfig::default();
        let artifact = export::export(
            ExportFormat::Xml,
            &config,
            "alpha & beta",
            "scan.png",
            when(),
            None,
        )
        .unwrap();

        assert_eq!(artifact.mime_type, "application/xml");
        assert_eq!(artifact.download_name, "scan.png.xml");

        let output = String::from_utf8(artifact.bytes).unwrap();
        assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(output.contains("<extracted_text>"));
        assert!(output.contains("alpha &amp; beta"));
    }

    /// Test the PDF artifact metadata through the shared entry point
    #[test]
    fn test_pdf_artifact_metadata() {
        let config = ExportConfig::default();
        let artifact = export::export(
            ExportFormat::Pdf,
            &config,
            "hello",
            "scan.png",
            when(),
            None,
        )
        .unwrap();

        assert_eq!(artifact.mime_type, "application/pdf");
        assert_eq!(artifact.download_name, "scan.png.pdf");
        assert!(artifact.bytes.starts_with(b"%PDF-"));
    }
}

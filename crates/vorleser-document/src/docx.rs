// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX reader — pull paragraph text out of `word/document.xml` and group it
// into page-sized segments.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::{debug, instrument};
use vorleser_core::error::{Result, VorleserError};

/// Part of the OOXML package holding the main document body.
const DOCUMENT_PART: &str = "word/document.xml";

/// Read the text of every non-blank paragraph, in document order.
///
/// Table cells and text boxes contribute their paragraphs too. Within a run,
/// `w:tab` becomes `\t` and `w:br`/`w:cr` become `\n`.
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn read_paragraphs(data: &[u8]) -> Result<Vec<String>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).map_err(|err| {
        VorleserError::Extraction(format!("failed to open DOCX package: {err}"))
    })?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|err| {
            VorleserError::Extraction(format!("DOCX package has no {DOCUMENT_PART}: {err}"))
        })?
        .read_to_string(&mut xml)
        .map_err(|err| VorleserError::Extraction(format!("failed to read {DOCUMENT_PART}: {err}")))?;

    let paragraphs = parse_document_xml(&xml)?;
    debug!(paragraphs = paragraphs.len(), "DOCX paragraphs read");
    Ok(paragraphs)
}

fn parse_document_xml(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    // Open paragraphs; text boxes nest a paragraph inside another one's run.
    let mut open: Vec<String> = Vec::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(|err| {
            VorleserError::Extraction(format!(
                "malformed DOCX XML at byte {}: {err}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(tag) => match tag.name().as_ref() {
                b"w:p" => open.push(String::new()),
                b"w:r" => run_depth += 1,
                b"w:t" => in_text = run_depth > 0,
                _ => {}
            },
            Event::End(tag) => match tag.name().as_ref() {
                b"w:p" => {
                    if let Some(text) = open.pop().filter(|text| !text.trim().is_empty()) {
                        paragraphs.push(text);
                    }
                }
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(tag) if run_depth > 0 => {
                let control = match tag.name().as_ref() {
                    b"w:tab" => Some('\t'),
                    b"w:br" | b"w:cr" => Some('\n'),
                    _ => None,
                };
                if let (Some(ch), Some(current)) = (control, open.last_mut()) {
                    current.push(ch);
                }
            }
            Event::Text(text) if in_text => {
                let decoded = text.unescape().map_err(|err| {
                    VorleserError::Extraction(format!("bad entity in DOCX text: {err}"))
                })?;
                if let Some(current) = open.last_mut() {
                    current.push_str(&decoded);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Group paragraphs into segments of at most `max_chars` characters.
///
/// A paragraph is never split: one longer than the bound becomes a segment
/// of its own. Paragraphs inside a segment are joined with `\n`, and the
/// separator is not counted. No paragraphs yields a single empty segment.
pub fn chunk_paragraphs<S: AsRef<str>>(paragraphs: &[S], max_chars: usize) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for paragraph in paragraphs {
        let paragraph = paragraph.as_ref();
        let len = paragraph.chars().count();

        if !current.is_empty() && current_len + len > max_chars {
            segments.push(current.join("\n"));
            current.clear();
            current_len = 0;
        }
        current.push(paragraph);
        current_len += len;
    }

    if !current.is_empty() {
        segments.push(current.join("\n"));
    }
    if segments.is_empty() {
        segments.push(String::new());
    }
    segments
}

/// In-memory DOCX builders shared by the crate's tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;

    /// Package `body` (the inner XML of `w:body`) as a minimal DOCX.
    pub(crate) fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer.write_all(br#"<?xml version="1.0"?><Types/>"#).unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// A DOCX with one plain run per paragraph.
    pub(crate) fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|text| format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>"))
            .collect();
        docx_with_body(&body)
    }
}

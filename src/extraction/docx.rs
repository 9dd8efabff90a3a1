//! DOCX text extraction via `docx-rs`.

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild, read_docx};

use super::ExtractionError;

/// Concatenate every body paragraph, each terminated by a newline, in document order.
///
/// Empty paragraphs still contribute their newline so the line structure of the source
/// document survives.
pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = read_docx(bytes).map_err(|error| ExtractionError::Docx(error.to_string()))?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            push_paragraph_text(paragraph, &mut text);
            text.push('\n');
        }
    }
    Ok(text)
}

/// Paragraph → Run → Text; runs are joined without separators.
fn push_paragraph_text(paragraph: &Paragraph, out: &mut String) {
    for child in &paragraph.children {
        let ParagraphChild::Run(run) = child else {
            continue;
        };
        for run_child in &run.children {
            match run_child {
                RunChild::Text(text) => out.push_str(&text.text),
                RunChild::Tab(_) => out.push('\t'),
                RunChild::Break(_) => out.push('\n'),
                _ => {}
            }
        }
    }
}

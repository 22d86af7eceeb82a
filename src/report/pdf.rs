//! PDF output (A4, builtin Helvetica)

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use super::{LineKind, Page, ReportDocument, ReportError, ReportResult};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 20.0;
const HEADER_Y: f32 = 280.0;
const BODY_TOP: f32 = 266.0;
const LINE_HEIGHT: f32 = 6.0;
const FOOTER_Y: f32 = 12.0;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pdf_err(e: impl std::fmt::Display) -> ReportError {
    ReportError::Pdf(e.to_string())
}

/// Render the document to PDF bytes in memory
pub fn render_pdf(doc: &ReportDocument) -> ReportResult<Vec<u8>> {
    let (pdf, first_page, first_layer) = PdfDocument::new(
        doc.title.as_str(),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: pdf.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?,
        bold: pdf.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?,
    };

    for (index, page) in doc.pages.iter().enumerate() {
        let layer = if index == 0 {
            pdf.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = pdf.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            pdf.get_page(p).get_layer(l)
        };
        draw_page(&layer, &fonts, doc, page, index + 1);
    }

    let bytes = pdf.save_to_bytes().map_err(pdf_err)?;
    tracing::debug!(pages = doc.page_count(), bytes = bytes.len(), "rendered PDF");
    Ok(bytes)
}

fn draw_page(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    doc: &ReportDocument,
    page: &Page,
    number: usize,
) {
    layer.use_text(doc.title.as_str(), 14.0, Mm(MARGIN_LEFT), Mm(HEADER_Y), &fonts.bold);

    let mut y = BODY_TOP;
    for line in &page.lines {
        match line.kind {
            LineKind::Heading => {
                layer.use_text(line.text.as_str(), 11.0, Mm(MARGIN_LEFT), Mm(y), &fonts.bold)
            }
            LineKind::Text => {
                layer.use_text(line.text.as_str(), 10.0, Mm(MARGIN_LEFT), Mm(y), &fonts.regular)
            }
            LineKind::Blank => {}
        }
        y -= LINE_HEIGHT;
    }

    layer.use_text(
        doc.footer(number),
        9.0,
        Mm(PAGE_WIDTH - MARGIN_LEFT - 20.0),
        Mm(FOOTER_Y),
        &fonts.regular,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_rows;

    #[test]
    fn test_pdf_bytes_have_header() {
        let doc = ReportDocument::build(&sample_rows(15, &[1, 4]), None);
        let bytes = render_pdf(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_empty_report_still_renders() {
        let doc = ReportDocument::build(&[], None);
        let bytes = render_pdf(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}

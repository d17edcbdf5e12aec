//! Minimal PDF 1.4 writer for laid-out documents.
//!
//! Uses the built-in Helvetica faces with WinAnsi encoding, so only Latin-1
//! text survives; anything else is written as `?`.

use std::fmt::Write as _;

use super::document::{text_width, Align, Document, DocumentRenderer, Element, Rgb};
use crate::error::RenderError;

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Renders documents as PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl DocumentRenderer for PdfRenderer {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, doc: &Document) -> Result<Vec<u8>, RenderError> {
        if doc.pages.is_empty() {
            return Err(RenderError::EmptyDocument);
        }
        let g = doc.geometry;
        if !(g.width.is_finite() && g.height.is_finite() && g.width > 0.0 && g.height > 0.0) {
            return Err(RenderError::InvalidGeometry(format!("{} x {} mm", g.width, g.height)));
        }

        let page_w = g.width * PT_PER_MM;
        let page_h = g.height * PT_PER_MM;
        let mut w = PdfWriter::default();

        // 1 catalog, 2 page tree, 3-4 fonts, then a page and content pair per page.
        let page_ids: Vec<usize> = (0..doc.pages.len()).map(|i| 5 + 2 * i).collect();
        w.object("<< /Type /Catalog /Pages 2 0 R >>".as_bytes());
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        w.object(format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, doc.pages.len()).as_bytes());
        w.object(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");
        w.object(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>");

        for (page, page_id) in doc.pages.iter().zip(&page_ids) {
            let content = content_stream(&page.elements, page_h);
            w.object(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                    page_w,
                    page_h,
                    page_id + 1
                )
                .as_bytes(),
            );
            let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
            stream.extend_from_slice(content.as_bytes());
            stream.extend_from_slice(b"\nendstream");
            w.object(&stream);
        }

        Ok(w.finish())
    }
}

#[derive(Default)]
struct PdfWriter {
    out: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn object(&mut self, body: &[u8]) {
        if self.out.is_empty() {
            self.out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        }
        self.offsets.push(self.out.len());
        let header = format!("{} 0 obj\n", self.offsets.len());
        self.out.extend_from_slice(header.as_bytes());
        self.out.extend_from_slice(body);
        self.out.extend_from_slice(b"\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for off in &self.offsets {
            let _ = writeln!(xref, "{:010} 00000 n ", off);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            xref_at
        );
        self.out.extend_from_slice(xref.as_bytes());
        self.out
    }
}

fn color(c: Rgb) -> String {
    format!(
        "{:.3} {:.3} {:.3}",
        c.0 as f32 / 255.0,
        c.1 as f32 / 255.0,
        c.2 as f32 / 255.0
    )
}

// Layout is top-left origin in mm; PDF user space is bottom-left in points.
fn content_stream(elements: &[Element], page_h: f32) -> String {
    let mut s = String::new();
    for el in elements {
        match el {
            Element::Fill { rect, color: c } => {
                let _ = writeln!(
                    s,
                    "{} rg\n{:.2} {:.2} {:.2} {:.2} re f",
                    color(*c),
                    rect.x * PT_PER_MM,
                    page_h - (rect.y + rect.h) * PT_PER_MM,
                    rect.w * PT_PER_MM,
                    rect.h * PT_PER_MM
                );
            }
            Element::Stroke { rect, color: c, line_width } => {
                let _ = writeln!(
                    s,
                    "{} RG\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re S",
                    color(*c),
                    line_width * PT_PER_MM,
                    rect.x * PT_PER_MM,
                    page_h - (rect.y + rect.h) * PT_PER_MM,
                    rect.w * PT_PER_MM,
                    rect.h * PT_PER_MM
                );
            }
            Element::Text { x, y, size, bold, color: c, align, text } => {
                let x = match align {
                    Align::Left => *x,
                    Align::Center => x - text_width(text, *size) / 2.0,
                };
                let font = if *bold { "F2" } else { "F1" };
                let _ = writeln!(
                    s,
                    "BT\n/{} {:.1} Tf\n{} rg\n{:.2} {:.2} Td\n({}) Tj\nET",
                    font,
                    size,
                    color(*c),
                    x * PT_PER_MM,
                    page_h - y * PT_PER_MM,
                    escape_text(text)
                );
            }
        }
    }
    s
}

/// Escapes text for a PDF literal string; output is pure ASCII.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            c if (0xA0..=0xFF).contains(&(c as u32)) => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::document::{Page, PageGeometry, Rect};

    #[test]
    fn escapes_delimiters_and_latin1() {
        assert_eq!(escape_text(r"a(b)c\"), r"a\(b\)c\\");
        assert_eq!(escape_text("±1"), "\\2611");
        assert_eq!(escape_text("x🔧y"), "x?y");
    }

    #[test]
    fn renders_one_page_per_layout_page() {
        let page = Page {
            elements: vec![Element::Fill {
                rect: Rect { x: 0.0, y: 0.0, w: 10.0, h: 10.0 },
                color: Rgb::ACCENT,
            }],
        };
        let doc = Document {
            geometry: PageGeometry::A4,
            pages: vec![page.clone(), page],
        };
        let bytes = PdfRenderer.render(&doc).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("/Count 2"));
        assert!(text.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn rejects_empty_documents() {
        let doc = Document {
            geometry: PageGeometry::A4,
            pages: Vec::new(),
        };
        assert!(matches!(PdfRenderer.render(&doc), Err(RenderError::EmptyDocument)));
    }
}

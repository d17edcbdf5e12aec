//! Paginated report layout.
//!
//! [`layout`] turns an active schedule into pages of positioned boxes and text
//! in millimetres, origin top-left. Renderers only translate that model into
//! bytes; they make no layout decisions beyond measuring text for centring.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::codec::encode_date;
use crate::error::{RenderError, Result};
use crate::session::ActiveSchedule;

use super::{export_file_name, write_export};

/// Millimetres per typographic point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 210.0,
        height: 297.0,
        margin: 20.0,
    };

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        PageGeometry::A4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const ACCENT: Rgb = Rgb(59, 130, 246);
    pub const HEADER_FILL: Rgb = Rgb(249, 250, 251);
    pub const ROW_FILL: Rgb = Rgb(248, 249, 250);
    pub const MUTED: Rgb = Rgb(128, 128, 128);
    pub const BORDER: Rgb = Rgb(200, 200, 200);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Fill { rect: Rect, color: Rgb },
    Stroke { rect: Rect, color: Rgb, line_width: f32 },
    /// `y` is the baseline; `size` is in points.
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: Rgb,
        align: Align,
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    /// Text of every text element, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

/// Turns a laid-out document into bytes.
pub trait DocumentRenderer {
    /// File extension of the produced format, without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, doc: &Document) -> std::result::Result<Vec<u8>, RenderError>;
}

pub const TITLE: &str = "MAINTENANCE SCHEDULER";
pub const TABLE_HEADERS: [&str; 4] = ["Task Name", "Due Date", "Priority", "Status"];
const COLUMN_WIDTHS: [f32; 4] = [60.0, 40.0, 30.0, 30.0];
const ROW_HEIGHT: f32 = 15.0;
const FOOTER_ZONE: f32 = 25.0;

/// Rough Helvetica advance width in millimetres.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * MM_PER_PT
}

/// Removes markup and decorative glyphs from advisory text.
///
/// Drops `<...>` tags and anything outside Latin-1 (emoji, variation
/// selectors), then collapses runs of whitespace.
pub fn strip_decorations(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if (c as u32) <= 0xFF => plain.push(c),
            _ => {}
        }
    }
    plain.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Greedy word wrap to `max_width` millimetres at `size` points.
pub fn wrap_text(text: &str, max_width: f32, size: f32) -> Vec<String> {
    let max_chars = ((max_width / (size * 0.5 * MM_PER_PT)).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            lines.push(head);
        }
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Cuts `text` to fit `max_width`, ending in `...` when shortened.
pub fn truncate_to_width(text: &str, max_width: f32, size: f32) -> String {
    let max_chars = (max_width / (size * 0.5 * MM_PER_PT)).floor() as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str("...");
    out
}

/// Keeps at most `max_lines` lines, marking the last kept one with `...`
/// when some were dropped.
fn fit_lines(mut lines: Vec<String>, max_lines: usize, max_width: f32) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        *last = truncate_to_width(&format!("{}...", last), max_width, 10.0);
    }
    lines
}

struct PageBuilder {
    geometry: PageGeometry,
    pages: Vec<Page>,
    y: f32,
}

impl PageBuilder {
    fn new(geometry: PageGeometry) -> Self {
        PageBuilder {
            geometry,
            pages: vec![Page::default()],
            y: geometry.margin,
        }
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn text(&mut self, x: f32, y: f32, size: f32, bold: bool, color: Rgb, text: impl Into<String>) {
        self.push(Element::Text {
            x,
            y,
            size,
            bold,
            color,
            align: Align::Left,
            text: text.into(),
        });
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.geometry.margin + 10.0;
    }

    fn fits(&self, height: f32) -> bool {
        self.y + height <= self.geometry.height - FOOTER_ZONE
    }

    /// Advisory lines that fit in a box starting at the cursor and
    /// ending above the footer.
    fn advisory_capacity(&self) -> usize {
        let room = self.geometry.height - FOOTER_ZONE - self.y - 5.0;
        ((room / 5.0).floor() as usize).max(1)
    }

    fn column_x(&self) -> [f32; 4] {
        let mut xs = [0.0; 4];
        let mut x = self.geometry.margin;
        for (i, w) in COLUMN_WIDTHS.iter().enumerate() {
            xs[i] = x;
            x += w;
        }
        xs
    }

    fn table_header(&mut self) {
        let g = self.geometry;
        self.push(Element::Fill {
            rect: Rect { x: g.margin, y: self.y - 5.0, w: g.content_width(), h: ROW_HEIGHT },
            color: Rgb::HEADER_FILL,
        });
        let xs = self.column_x();
        let y = self.y + 5.0;
        for (x, header) in xs.iter().zip(TABLE_HEADERS) {
            self.text(*x, y, 12.0, true, Rgb::BLACK, header);
        }
        self.y += 20.0;
    }

    fn finish(mut self, footer: &str) -> Vec<Page> {
        let g = self.geometry;
        for page in &mut self.pages {
            page.elements.push(Element::Text {
                x: g.width / 2.0,
                y: g.height - 10.0,
                size: 8.0,
                bold: false,
                color: Rgb::MUTED,
                align: Align::Center,
                text: footer.to_string(),
            });
            page.elements.push(Element::Stroke {
                rect: Rect { x: 10.0, y: 10.0, w: g.width - 20.0, h: g.height - 20.0 },
                color: Rgb::BORDER,
                line_width: 0.5,
            });
        }
        self.pages
    }
}

/// Lays out the report for `active`, stamped with `now`.
pub fn layout(active: &ActiveSchedule, geometry: PageGeometry, now: DateTime<Utc>) -> Document {
    let g = geometry;
    let mut b = PageBuilder::new(g);
    let today = now.date_naive();

    // Title banner
    b.push(Element::Fill {
        rect: Rect { x: 0.0, y: 0.0, w: g.width, h: 40.0 },
        color: Rgb::ACCENT,
    });
    b.push(Element::Text {
        x: g.width / 2.0,
        y: 25.0,
        size: 24.0,
        bold: true,
        color: Rgb::WHITE,
        align: Align::Center,
        text: TITLE.to_string(),
    });
    b.y = 60.0;

    b.text(g.margin, b.y, 18.0, true, Rgb::BLACK, "Machine Information");
    b.y += 15.0;
    let machine = &active.machine;
    let info = [
        format!("Machine Name: {}", machine.name),
        format!("Last Serviced: {}", encode_date(machine.last_serviced)),
        format!("Usage Frequency: {}", machine.usage_frequency.capitalized()),
        format!("Report Generated: {}", encode_date(active.generated_at.date_naive())),
    ];
    for line in info {
        let line = truncate_to_width(&line, g.content_width(), 12.0);
        b.text(g.margin, b.y, 12.0, false, Rgb::BLACK, line);
        b.y += 8.0;
    }
    b.y += 10.0;

    // Advisory box
    b.text(g.margin, b.y, 16.0, true, Rgb::BLACK, "Maintenance Recommendation");
    b.y += 15.0;
    let advisory = strip_decorations(&active.schedule.advisory);
    let lines = fit_lines(
        wrap_text(&advisory, g.content_width() - 10.0, 10.0),
        b.advisory_capacity(),
        g.content_width() - 10.0,
    );
    let box_height = (lines.len() as f32 * 5.0 + 10.0).max(40.0);
    b.push(Element::Stroke {
        rect: Rect { x: g.margin, y: b.y - 5.0, w: g.content_width(), h: box_height },
        color: Rgb::ACCENT,
        line_width: 1.0,
    });
    let mut line_y = b.y + 5.0;
    for line in lines {
        b.text(g.margin + 5.0, line_y, 10.0, false, Rgb::BLACK, line);
        line_y += 5.0;
    }
    b.y += box_height + 15.0;

    // Task table
    if !b.fits(15.0 + 20.0 + ROW_HEIGHT) {
        b.new_page();
    }
    b.text(g.margin, b.y, 16.0, true, Rgb::BLACK, "Scheduled Maintenance Tasks");
    b.y += 15.0;
    b.table_header();
    let xs = b.column_x();
    for (i, task) in active.schedule.tasks.iter().enumerate() {
        if !b.fits(ROW_HEIGHT) {
            b.new_page();
            b.table_header();
        }
        if i % 2 == 0 {
            b.push(Element::Fill {
                rect: Rect { x: g.margin, y: b.y - 5.0, w: g.content_width(), h: ROW_HEIGHT },
                color: Rgb::ROW_FILL,
            });
        }
        let cells = [
            task.name.clone(),
            encode_date(task.due_date),
            task.priority.to_string(),
            task.effective_status(today).to_string(),
        ];
        let y = b.y + 5.0;
        for ((x, width), cell) in xs.iter().zip(COLUMN_WIDTHS).zip(cells) {
            let cell = truncate_to_width(&cell, width - 2.0, 10.0);
            b.text(*x, y, 10.0, false, Rgb::BLACK, cell);
        }
        b.y += ROW_HEIGHT;
    }

    let footer = format!("Generated by Maintenance Scheduler on {}", encode_date(today));
    Document {
        geometry: g,
        pages: b.finish(&footer),
    }
}

/// Lays out and renders the report.
pub fn render(
    active: &ActiveSchedule,
    renderer: &dyn DocumentRenderer,
    now: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let doc = layout(active, PageGeometry::A4, now);
    Ok(renderer.render(&doc)?)
}

/// Renders the report and writes `<machine>-maintenance-schedule.<ext>` into `dir`.
pub fn write(
    active: &ActiveSchedule,
    renderer: &dyn DocumentRenderer,
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf> {
    let bytes = render(active, renderer, now)?;
    let file_name = export_file_name(&active.machine.name, renderer.extension());
    write_export(dir, &file_name, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars_wide(n: f32, size: f32) -> f32 {
        (n + 0.5) * size * 0.5 * MM_PER_PT
    }

    #[test]
    fn wrap_respects_width() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        let lines = wrap_text(text, chars_wide(20.0, 12.0), 12.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap_text("abcdefghij", chars_wide(5.0, 10.0), 10.0);
        assert_eq!(lines, vec!["abcde".to_string(), "fghij".to_string()]);
    }

    #[test]
    fn truncate_adds_ellipsis() {
        let width = chars_wide(10.0, 10.0);
        assert_eq!(truncate_to_width("short", width, 10.0), "short");
        assert_eq!(truncate_to_width("a much longer cell", width, 10.0), "a much...");
    }

    #[test]
    fn strip_removes_tags_and_emoji() {
        assert_eq!(
            strip_decorations("⚠️ <b>CRITICAL</b>  ALERT: ±0.001"),
            "CRITICAL ALERT: ±0.001"
        );
    }
}

//! A4 layout of a [`ReportPlan`] with printpdf.
//!
//! Builtin Helvetica only, so text widths are estimated from an average glyph
//! width rather than measured. Tables repeat their header row after a page
//! break; charts that do not fit in the remaining space move to the next page.
//! Rows taller than a whole page are split at line boundaries.

use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use tracing::debug;

use super::plan::{AMOUNT_COLUMN, Block, ReportPlan, TABLE_HEADER, TABLE_WIDTHS_MM};
use crate::chart::render;
use crate::error::ReportError;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 20.0;
const CONTENT_W: f32 = PAGE_W - 2.0 * MARGIN;

const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size
const GLYPH_WIDTH: f32 = 0.5;

const TITLE_PT: f32 = 14.0;
const HEADING_PT: f32 = 11.0;
const BODY_PT: f32 = 10.0;
const TABLE_PT: f32 = 8.0;
const CELL_PAD: f32 = 1.5;

const HEADER_BLUE: (f32, f32, f32) = (0x42 as f32 / 255.0, 0x85 as f32 / 255.0, 0xF4 as f32 / 255.0);

fn render_err(e: impl std::fmt::Display) -> ReportError {
    ReportError::Render(format!("pdf: {e}"))
}

/// Lay out and serialize the report.
pub fn render_pdf(plan: &ReportPlan) -> Result<Vec<u8>, ReportError> {
    let mut writer = Writer::new("Laporan Pengeluaran")?;
    for block in &plan.blocks {
        writer.block(block)?;
    }
    debug!(pages = writer.pages, "report laid out");
    writer.doc.save_to_bytes().map_err(render_err)
}

struct Writer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Top of the free space on the current page, mm from the bottom edge
    y: f32,
    pages: usize,
}

impl Writer {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_err)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(render_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_H - MARGIN,
            pages: 1,
        })
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), format!("Page {}", self.pages));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_H - MARGIN;
    }

    /// Start a new page unless `height` still fits on this one.
    fn ensure(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.new_page();
        }
    }

    fn block(&mut self, block: &Block) -> Result<(), ReportError> {
        match block {
            Block::Title(text) => self.title(text),
            Block::Heading(text) => self.paragraph(text, HEADING_PT, true),
            Block::Paragraph { text, bold } => self.paragraph(text, BODY_PT, *bold),
            Block::Table { rows } => self.table(rows),
            Block::Chart {
                spec,
                width_mm,
                height_mm,
            } => {
                let image = render(spec)?.to_dynamic_image()?;
                self.image(&image, *width_mm, *height_mm);
            }
            Block::Spacer(mm) => self.y -= mm,
            Block::PageBreak => self.new_page(),
        }
        Ok(())
    }

    fn set_text_color(&self, (r, g, b): (f32, f32, f32)) {
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    }

    fn title(&mut self, text: &str) {
        let height = line_height(TITLE_PT) + 2.0;
        self.ensure(height);
        let x = ((PAGE_W - text_width(text, TITLE_PT)) / 2.0).max(MARGIN);
        self.y -= line_height(TITLE_PT);
        self.set_text_color((0.0, 0.0, 0.0));
        self.layer.use_text(text, TITLE_PT, Mm(x), Mm(self.y), &self.bold);
        self.y -= 2.0;
    }

    fn paragraph(&mut self, text: &str, size: f32, bold: bool) {
        let font = if bold { self.bold.clone() } else { self.regular.clone() };
        self.set_text_color((0.0, 0.0, 0.0));
        for raw in text.lines() {
            let indent = raw.len() - raw.trim_start().len();
            let x = MARGIN + text_width(&raw[..indent], size);
            for line in wrap(raw, chars_per_line(CONTENT_W - (x - MARGIN), size)) {
                self.ensure(line_height(size));
                self.y -= line_height(size);
                self.layer.use_text(line, size, Mm(x), Mm(self.y), &font);
            }
        }
    }

    fn table(&mut self, rows: &[[String; 5]]) {
        let header = wrap_cells(&TABLE_HEADER.map(str::to_string));
        self.table_row(&header, true);
        for row in rows {
            let mut cells = wrap_cells(row);
            loop {
                let needed = line_count(&cells);
                let fit = self.table_lines_left();
                if needed <= fit {
                    self.table_row(&cells, false);
                    break;
                }
                // rows that fit on a fresh page move there whole, taller ones are split
                if fit > 0 && needed > self.table_lines_per_page(&header) {
                    let rest = split_cells(&mut cells, fit);
                    self.table_row(&cells, false);
                    cells = rest;
                }
                self.new_page();
                self.table_row(&header, true);
            }
        }
    }

    fn table_lines_left(&self) -> usize {
        lines_below(self.y)
    }

    /// Capacity of a fresh page once the header is drawn.
    fn table_lines_per_page(&self, header: &[Vec<String>; 5]) -> usize {
        lines_below((PAGE_H - MARGIN) - row_height(header))
    }

    fn table_row(&mut self, cells: &[Vec<String>; 5], header: bool) {
        let height = row_height(cells);
        self.ensure(height);
        let top = self.y;
        let bottom = top - height;
        let width: f32 = TABLE_WIDTHS_MM.iter().sum();

        if header {
            // a stroke as thick as the row paints the background
            self.layer.set_outline_color(Color::Rgb(Rgb::new(HEADER_BLUE.0, HEADER_BLUE.1, HEADER_BLUE.2, None)));
            self.layer.set_outline_thickness(height / PT_TO_MM);
            let mid = bottom + height / 2.0;
            self.stroke(&[(MARGIN, mid), (MARGIN + width, mid)]);
        }

        let (font, color) = if header {
            (self.bold.clone(), (1.0, 1.0, 1.0))
        } else {
            (self.regular.clone(), (0.0, 0.0, 0.0))
        };
        self.set_text_color(color);

        let mut x = MARGIN;
        for (col, (lines, col_w)) in cells.iter().zip(TABLE_WIDTHS_MM).enumerate() {
            let mut line_y = top - CELL_PAD;
            for line in lines {
                line_y -= line_height(TABLE_PT);
                let lx = if header {
                    x + (col_w - text_width(line, TABLE_PT)) / 2.0
                } else if col == AMOUNT_COLUMN {
                    x + col_w - CELL_PAD - text_width(line, TABLE_PT)
                } else {
                    x + CELL_PAD
                };
                self.layer.use_text(line.as_str(), TABLE_PT, Mm(lx.max(x + 0.5)), Mm(line_y), &font);
            }
            x += col_w;
        }

        // grid
        self.layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.layer.set_outline_thickness(0.5);
        self.stroke(&[(MARGIN, top), (MARGIN + width, top)]);
        self.stroke(&[(MARGIN, bottom), (MARGIN + width, bottom)]);
        let mut x = MARGIN;
        self.stroke(&[(x, top), (x, bottom)]);
        for col_w in TABLE_WIDTHS_MM {
            x += col_w;
            self.stroke(&[(x, top), (x, bottom)]);
        }

        self.y = bottom;
    }

    fn stroke(&self, points: &[(f32, f32)]) {
        self.layer.add_line(Line {
            points: points.iter().map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false)).collect(),
            is_closed: false,
        });
    }

    /// Place an image centered horizontally, scaled to `width_mm` × `height_mm`.
    fn image(&mut self, image: &image::DynamicImage, width_mm: f32, height_mm: f32) {
        self.ensure(height_mm);
        self.y -= height_mm;

        // at this dpi the image is exactly width_mm wide
        let dpi = image.width() as f32 * 25.4 / width_mm;
        let natural_h = image.height() as f32 * 25.4 / dpi;

        Image::from_dynamic_image(image).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm((PAGE_W - width_mm) / 2.0)),
                translate_y: Some(Mm(self.y)),
                scale_x: Some(1.0),
                scale_y: Some(height_mm / natural_h),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
    }
}

fn line_height(size_pt: f32) -> f32 {
    size_pt * PT_TO_MM * 1.3
}

fn text_width(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * GLYPH_WIDTH * PT_TO_MM
}

fn chars_per_line(width_mm: f32, size_pt: f32) -> usize {
    ((width_mm / (size_pt * GLYPH_WIDTH * PT_TO_MM)) as usize).max(1)
}

/// Each cell wrapped to its column width.
fn wrap_cells(cells: &[String; 5]) -> [Vec<String>; 5] {
    std::array::from_fn(|i| wrap(&cells[i], chars_per_line(TABLE_WIDTHS_MM[i] - 2.0 * CELL_PAD, TABLE_PT)))
}

fn line_count(cells: &[Vec<String>; 5]) -> usize {
    cells.iter().map(Vec::len).max().unwrap_or(1).max(1)
}

fn row_height(cells: &[Vec<String>; 5]) -> f32 {
    line_count(cells) as f32 * line_height(TABLE_PT) + 2.0 * CELL_PAD
}

/// Wrapped table lines that fit between `top` and the bottom margin.
fn lines_below(top: f32) -> usize {
    let free = top - MARGIN - 2.0 * CELL_PAD;
    if free <= 0.0 { 0 } else { (free / line_height(TABLE_PT)) as usize }
}

/// Keep the first `at` lines of every cell and return the remainder.
fn split_cells(cells: &mut [Vec<String>; 5], at: usize) -> [Vec<String>; 5] {
    std::array::from_fn(|i| {
        if cells[i].len() > at {
            cells[i].split_off(at)
        } else {
            Vec::new()
        }
    })
}

/// Greedy word wrap at `max` characters; words longer than a line are split.
fn wrap(text: &str, max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..max).collect());
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() { word.len() } else { current.chars().count() + 1 + word.len() };
        if needed > max && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

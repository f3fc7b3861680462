//! Rasterizing chart plans with plotters.
//!
//! Everything draws into an in-memory RGB buffer; nothing touches the
//! filesystem. Renders are serialized by a process-wide lock and the drawing
//! area is dropped before the lock is released, whether drawing succeeded or
//! not.

use std::error::Error;
use std::io::Cursor;
use std::sync::{Mutex, PoisonError};

use image::{DynamicImage, ImageOutputFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, warn};

use super::plan::{BarChart, ChartSpec, Orientation, PieChart, Rgb};
use crate::error::ReportError;
use crate::format::group_thousands;

static RENDER_LOCK: Mutex<()> = Mutex::new(());

const FONT: &str = "sans-serif";

type DrawResult = Result<(), Box<dyn Error>>;
type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// A rendered chart as raw RGB8 pixels.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    pub fn to_rgb_image(&self) -> Result<RgbImage, ReportError> {
        RgbImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| ReportError::Render("pixel buffer does not match image size".to_string()))
    }

    pub fn to_dynamic_image(&self) -> Result<DynamicImage, ReportError> {
        Ok(DynamicImage::ImageRgb8(self.to_rgb_image()?))
    }

    pub fn to_png(&self) -> Result<Vec<u8>, ReportError> {
        let mut out = Cursor::new(Vec::new());
        self.to_dynamic_image()?
            .write_to(&mut out, ImageOutputFormat::Png)
            .map_err(|e| ReportError::Render(format!("png encoding failed: {e}")))?;
        Ok(out.into_inner())
    }
}

/// Draw `spec` into a fresh buffer.
pub fn render(spec: &ChartSpec) -> Result<RasterImage, ReportError> {
    let (width, height) = spec.size();
    let mut pixels = vec![0u8; width as usize * height as usize * 3];

    {
        let _guard = RENDER_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        if let Err(e) = draw(&root, spec) {
            warn!(error = %e, width, height, "chart rendering failed");
            return Err(ReportError::Render(e.to_string()));
        }
    }

    debug!(width, height, "chart rendered");
    Ok(RasterImage { width, height, pixels })
}

pub fn render_png(spec: &ChartSpec) -> Result<Vec<u8>, ReportError> {
    render(spec)?.to_png()
}

fn draw(root: &Area<'_>, spec: &ChartSpec) -> DrawResult {
    root.fill(&WHITE)?;
    match spec {
        ChartSpec::Bars(chart) => match chart.orientation {
            Orientation::Vertical => draw_vertical(root, chart)?,
            Orientation::Horizontal => draw_horizontal(root, chart)?,
        },
        ChartSpec::Pie(chart) => draw_pie(root, chart)?,
    }
    root.present()?;
    Ok(())
}

fn color(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Font sizes scale with the image height.
fn px(height: u32, fraction: f64, min: f64) -> f64 {
    (height as f64 * fraction).max(min)
}

// ── Bars ──

fn draw_vertical(root: &Area<'_>, chart: &BarChart) -> DrawResult {
    let (_, h) = chart.size;
    let n = chart.bars.len().max(1);

    let mut cc = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, px(h, 0.04, 18.0)).into_font())
        .margin(20)
        .x_label_area_size(px(h, 0.16, 60.0) as u32)
        .y_label_area_size(px(h, 0.14, 70.0) as u32)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..chart.value_max)?;

    let x_fmt = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => chart.bars.get(*i).map(|b| b.label.clone()).unwrap_or_default(),
        _ => String::new(),
    };
    let y_fmt = |v: &f64| group_thousands(v.max(0.0) as u64);

    let label_font = (FONT, px(h, 0.02, 11.0)).into_font();
    let x_label_style = if chart.bars.len() > 10 {
        label_font.transform(FontTransform::Rotate90)
    } else {
        label_font.clone()
    };

    let mut mesh = cc.configure_mesh();
    mesh.disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_label_style(x_label_style)
        .y_label_style(label_font.clone());
    if let Some(desc) = &chart.value_desc {
        mesh.y_desc(desc).axis_desc_style(label_font);
    }
    mesh.draw()?;

    cc.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
        let mut rect = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), bar.value as f64)],
            color(bar.color).filled(),
        );
        rect.set_margin(0, 0, 6, 6);
        rect
    }))?;

    let annotation = TextStyle::from((FONT, px(h, 0.018, 10.0)).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    cc.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
        Text::new(
            bar.annotation.clone(),
            (SegmentValue::CenterOf(i), bar.value as f64),
            annotation.clone(),
        )
    }))?;

    Ok(())
}

/// Bar `i` sits in row `n - 1 - i`, so the first bar is drawn at the top.
fn draw_horizontal(root: &Area<'_>, chart: &BarChart) -> DrawResult {
    let (w, h) = chart.size;
    let n = chart.bars.len().max(1);
    let label_of_row = |row: usize| chart.bars.get(n - 1 - row).map(|b| b.label.clone());

    let mut cc = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, px(h, 0.045, 18.0)).into_font())
        .margin(20)
        .x_label_area_size(px(h, 0.1, 40.0) as u32)
        .y_label_area_size(px(w, 0.16, 100.0) as u32)
        .build_cartesian_2d(0f64..chart.value_max, (0..n).into_segmented())?;

    let y_fmt = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(row) if *row < n => label_of_row(*row).unwrap_or_default(),
        _ => String::new(),
    };
    let x_fmt = |v: &f64| group_thousands(v.max(0.0) as u64);
    let label_font = (FONT, px(h, 0.03, 11.0)).into_font();

    let mut mesh = cc.configure_mesh();
    mesh.disable_y_mesh()
        .y_labels(n + 1)
        .y_label_formatter(&y_fmt)
        .x_label_formatter(&x_fmt)
        .label_style(label_font.clone());
    if let Some(desc) = &chart.value_desc {
        mesh.x_desc(desc).axis_desc_style(label_font);
    }
    mesh.draw()?;

    cc.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
        let row = n - 1 - i;
        let mut rect = Rectangle::new(
            [(0.0, SegmentValue::Exact(row)), (bar.value as f64, SegmentValue::Exact(row + 1))],
            color(bar.color).filled(),
        );
        rect.set_margin(8, 8, 0, 0);
        rect
    }))?;

    let annotation = TextStyle::from((FONT, px(h, 0.028, 10.0)).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
    cc.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
        EmptyElement::at((bar.value as f64, SegmentValue::CenterOf(n - 1 - i)))
            + Text::new(bar.annotation.clone(), (6, 0), annotation.clone())
    }))?;

    Ok(())
}

// ── Pie ──

/// Wedges run counterclockwise from twelve o'clock, in pixel space.
fn draw_pie(root: &Area<'_>, chart: &PieChart) -> DrawResult {
    let (_, h) = chart.size;
    let area = root.titled(&chart.title, (FONT, px(h, 0.035, 18.0)))?;
    let (aw, ah) = area.dim_in_pixel();
    let center = (aw as i32 / 2, ah as i32 / 2);
    let radius = aw.min(ah) as f64 * 0.32;

    let label_px = px(h, 0.02, 11.0);
    let value_px = px(h, 0.018, 10.0);
    let value_style = TextStyle::from((FONT, value_px).into_font().style(FontStyle::Bold))
        .pos(Pos::new(HPos::Center, VPos::Center));

    let mut start = 90.0_f64;
    for wedge in &chart.wedges {
        let sweep = 360.0 * wedge.share;
        let outline = wedge_outline(center, radius, start, sweep);
        area.draw(&Polygon::new(outline.clone(), color(wedge.color).filled()))?;
        area.draw(&PathElement::new(outline, WHITE.stroke_width(2)))?;

        let mid = (start + sweep / 2.0).to_radians();
        let at = |r: f64| {
            (
                center.0 + (r * mid.cos()).round() as i32,
                center.1 - (r * mid.sin()).round() as i32,
            )
        };

        let hpos = if mid.cos() >= 0.0 { HPos::Left } else { HPos::Right };
        let label_style = TextStyle::from((FONT, label_px).into_font()).pos(Pos::new(hpos, VPos::Center));
        area.draw(&Text::new(wedge.label.clone(), at(radius * 1.08), label_style))?;

        let (x, y) = at(radius * 0.65);
        let half_line = (value_px * 0.6) as i32;
        area.draw(&Text::new(wedge.percent_label(), (x, y - half_line), value_style.clone()))?;
        area.draw(&Text::new(wedge.amount_label(), (x, y + half_line), value_style.clone()))?;

        start += sweep;
    }

    Ok(())
}

/// Closed outline of one wedge: center, then the arc in one-degree steps.
fn wedge_outline(center: (i32, i32), radius: f64, start_deg: f64, sweep_deg: f64) -> Vec<(i32, i32)> {
    let steps = sweep_deg.ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 3);
    points.push(center);
    for s in 0..=steps {
        let angle = (start_deg + sweep_deg * s as f64 / steps as f64).to_radians();
        points.push((
            center.0 + (radius * angle.cos()).round() as i32,
            center.1 - (radius * angle.sin()).round() as i32,
        ));
    }
    points.push(center);
    points
}

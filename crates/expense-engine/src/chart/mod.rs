//! Chart descriptions and their rasterization.
//!
//! [`plan`] turns buckets into plain data (bars, wedges, colors, bounds) and is
//! fully testable. [`render`] draws a plan with plotters into an RGB buffer.

pub mod plan;
pub mod render;

pub use plan::{Bar, BarChart, ChartSpec, Orientation, PieChart, Rgb, Wedge};
pub use render::{RasterImage, render, render_png};

//! What each chart shows, independent of how it is drawn.

use std::collections::BTreeMap;

use crate::aggregate::{CategoryTotals, DayBucket, MonthBucket, MonthKey};
use crate::format::{format_rupiah, format_rupiah_spaced};
use crate::normalize::Amount;
use crate::top::RankedCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(v: u32) -> Self {
        Self((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }
}

pub const DAILY_BLUE: Rgb = Rgb::hex(0x4285F4);
pub const MONTHLY_GREEN: Rgb = Rgb::hex(0x34A853);

const PASTEL: [Rgb; 9] = [
    Rgb::hex(0xFBB4AE),
    Rgb::hex(0xB3CDE3),
    Rgb::hex(0xCCEBC5),
    Rgb::hex(0xDECBE4),
    Rgb::hex(0xFED9A6),
    Rgb::hex(0xFFFFCC),
    Rgb::hex(0xE5D8BD),
    Rgb::hex(0xFDDAEC),
    Rgb::hex(0xF2F2F2),
];

const BLUES: [Rgb; 9] = [
    Rgb::hex(0xF7FBFF),
    Rgb::hex(0xDEEBF7),
    Rgb::hex(0xC6DBEF),
    Rgb::hex(0x9ECAE1),
    Rgb::hex(0x6BAED6),
    Rgb::hex(0x4292C6),
    Rgb::hex(0x2171B5),
    Rgb::hex(0x08519C),
    Rgb::hex(0x08306B),
];

/// Pixel dimensions (width, height).
pub type Size = (u32, u32);

pub const DAILY_SIZE: Size = (1400, 600);
pub const PIE_SIZE: Size = (1000, 800);
pub const TOP_SIZE: Size = (1000, 600);

pub const REPORT_DAILY_SIZE: Size = (1500, 700);
pub const REPORT_PIE_SIZE: Size = (1000, 1000);
pub const REPORT_TOP_SIZE: Size = (1500, 500);
pub const REPORT_MONTHLY_SIZE: Size = (1500, 700);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Categories along x, bars grow upward
    Vertical,
    /// Categories along y, first bar at the top
    Horizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: Amount,
    /// Text drawn at the end of the bar
    pub annotation: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub value_desc: Option<String>,
    pub orientation: Orientation,
    /// In display order: left to right, or top to bottom
    pub bars: Vec<Bar>,
    /// Upper bound of the value axis; always > 0
    pub value_max: f64,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wedge {
    pub label: String,
    pub value: Amount,
    /// Fraction of the whole, in [0, 1]; a zero wedge still carries its label
    pub share: f64,
    pub color: Rgb,
}

impl Wedge {
    /// `"62.5%"`
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.share * 100.0)
    }

    /// `"(Rp 50.000)"`
    pub fn amount_label(&self) -> String {
        format!("({})", format_rupiah_spaced(self.value))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    /// Insertion order, drawn counterclockwise from twelve o'clock
    pub wedges: Vec<Wedge>,
    pub size: Size,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Bars(BarChart),
    Pie(PieChart),
}

impl ChartSpec {
    pub fn size(&self) -> Size {
        match self {
            Self::Bars(c) => c.size,
            Self::Pie(c) => c.size,
        }
    }
}

fn headroom(max: Amount, factor: f64) -> f64 {
    if max == 0 { 1.0 } else { max as f64 * factor }
}

// ── Builders ──

/// Daily bars in ascending date order; the value axis tops out at 1.2 × max.
pub fn daily_chart(days: &[DayBucket], title: &str, size: Size) -> BarChart {
    let bars: Vec<Bar> = days
        .iter()
        .map(|d| Bar {
            label: d.label(),
            value: d.total,
            annotation: format_rupiah(d.total),
            color: DAILY_BLUE,
        })
        .collect();
    let max = bars.iter().map(|b| b.value).max().unwrap_or(0);

    BarChart {
        title: title.to_string(),
        value_desc: Some("Nominal".to_string()),
        orientation: Orientation::Vertical,
        bars,
        value_max: headroom(max, 1.2),
        size,
    }
}

/// One wedge per category in insertion order.
///
/// `None` when there is nothing to draw: no categories, or every total is 0.
pub fn category_pie(totals: &CategoryTotals, title: &str, size: Size) -> Option<PieChart> {
    let sum = totals.total();
    if sum == 0 {
        return None;
    }

    let wedges = totals
        .iter()
        .enumerate()
        .map(|(i, b)| Wedge {
            label: b.label.clone(),
            value: b.total,
            share: b.total as f64 / sum as f64,
            color: PASTEL[i % PASTEL.len()],
        })
        .collect();

    Some(PieChart {
        title: title.to_string(),
        wedges,
        size,
    })
}

/// Horizontal bars in rank order, largest at the top, shaded along a blue ramp.
pub fn top_chart(ranked: &[RankedCategory], title: &str, size: Size) -> BarChart {
    let bars: Vec<Bar> = ranked
        .iter()
        .enumerate()
        .map(|(i, r)| Bar {
            label: r.label.clone(),
            value: r.total,
            annotation: format_rupiah(r.total),
            color: blues_ramp(i, ranked.len()),
        })
        .collect();
    let max = bars.iter().map(|b| b.value).max().unwrap_or(0);

    BarChart {
        title: title.to_string(),
        value_desc: Some("Total Pengeluaran".to_string()),
        orientation: Orientation::Horizontal,
        bars,
        // extra room on the right for the annotations
        value_max: headroom(max, 1.25),
        size,
    }
}

/// One bar per month, ascending, labelled `"April 2025"`.
pub fn monthly_chart(months: &BTreeMap<MonthKey, MonthBucket<'_>>, size: Size) -> BarChart {
    let bars: Vec<Bar> = months
        .iter()
        .map(|(key, bucket)| Bar {
            label: key.label(),
            value: bucket.total,
            annotation: format_rupiah(bucket.total),
            color: MONTHLY_GREEN,
        })
        .collect();
    let max = bars.iter().map(|b| b.value).max().unwrap_or(0);

    BarChart {
        title: "Perbandingan Pengeluaran Bulanan".to_string(),
        value_desc: None,
        orientation: Orientation::Vertical,
        bars,
        value_max: headroom(max, 1.2),
        size,
    }
}

/// Colors evenly spaced over 40–80% of the Blues scale.
fn blues_ramp(i: usize, n: usize) -> Rgb {
    let t = if n <= 1 { 0.4 } else { 0.4 + 0.4 * i as f64 / (n - 1) as f64 };
    let pos = t * (BLUES.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(BLUES.len() - 1);
    let frac = pos - lo as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (BLUES[lo], BLUES[hi]);
    Rgb(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{by_category, by_day, by_month};
    use crate::record::ExpenseRecord;
    use crate::top::top_categories;

    fn records() -> Vec<ExpenseRecord> {
        vec![
            ExpenseRecord::new("05-04-2025", "Makanan", "50.000", ""),
            ExpenseRecord::new("05-04-2025", "Transport", "20000", ""),
            ExpenseRecord::new("06-04-2025", "Makanan", "abc", ""),
        ]
    }

    #[test]
    fn test_daily_bounds_and_annotations() {
        let chart = daily_chart(&by_day(&records()), "Grafik Pengeluaran Harian", DAILY_SIZE);
        assert_eq!(chart.bars.len(), 2);
        assert_eq!(chart.bars[0].label, "05-04-2025");
        assert_eq!(chart.bars[0].annotation, "Rp70.000");
        assert_eq!(chart.bars[1].annotation, "Rp0");
        assert!((chart.value_max - 84_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_daily_has_unit_axis() {
        let chart = daily_chart(&[], "x", DAILY_SIZE);
        assert!(chart.bars.is_empty());
        assert_eq!(chart.value_max, 1.0);
    }

    #[test]
    fn test_pie_shares_sum_to_one_in_insertion_order() {
        let pie = category_pie(&by_category(&records(), None), "t", PIE_SIZE).unwrap();
        let labels: Vec<&str> = pie.wedges.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(labels, vec!["Makanan", "Transport"]);
        let sum: f64 = pie.wedges.iter().map(|w| w.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(pie.wedges[0].percent_label(), "71.4%");
        assert_eq!(pie.wedges[0].amount_label(), "(Rp 50.000)");
        assert_ne!(pie.wedges[0].color, pie.wedges[1].color);
    }

    #[test]
    fn test_zero_categories_keep_a_labelled_wedge() {
        let mut records = records();
        records.push(ExpenseRecord::new("06-04-2025", "Hiburan", "abc", ""));
        let pie = category_pie(&by_category(&records, None), "t", PIE_SIZE).unwrap();
        let labels: Vec<&str> = pie.wedges.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(labels, vec!["Makanan", "Transport", "Hiburan"]);
        assert_eq!(pie.wedges[2].percent_label(), "0.0%");
        assert_eq!(pie.wedges[2].amount_label(), "(Rp 0)");
    }

    #[test]
    fn test_zero_total_pie_is_none() {
        let zero = vec![ExpenseRecord::new("05-04-2025", "Makanan", "abc", "")];
        assert!(category_pie(&by_category(&zero, None), "t", PIE_SIZE).is_none());
        assert!(category_pie(&CategoryTotals::default(), "t", PIE_SIZE).is_none());
    }

    #[test]
    fn test_top_bars_keep_rank_order_and_darken() {
        let ranked = top_categories(&by_category(&records(), None), 5);
        let chart = top_chart(&ranked, "t", TOP_SIZE);
        assert_eq!(chart.orientation, Orientation::Horizontal);
        assert_eq!(chart.bars[0].label, "Makanan");
        let lum = |c: Rgb| c.0 as u32 + c.1 as u32 + c.2 as u32;
        assert!(lum(chart.bars[0].color) > lum(chart.bars[1].color));
    }

    #[test]
    fn test_monthly_bars_are_chronological() {
        let records = vec![
            ExpenseRecord::new("01-05-2025", "A", "300", ""),
            ExpenseRecord::new("01-04-2025", "A", "100", ""),
        ];
        let chart = monthly_chart(&by_month(&records), REPORT_MONTHLY_SIZE);
        let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["April 2025", "Mei 2025"]);
        assert!((chart.value_max - 360.0).abs() < 1e-6);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(DAILY_BLUE, Rgb(0x42, 0x85, 0xF4));
        assert_eq!(blues_ramp(0, 1), blues_ramp(0, 5));
    }
}

//! Indonesian display formatting shared by listings, captions, charts and reports.

use crate::normalize::Amount;

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Indonesian month name for 1–12, empty string otherwise.
///
/// A lookup, not a validator: check the range before trusting the output.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTHS[(month - 1) as usize],
        _ => "",
    }
}

/// `1250000` → `"1.250.000"`
pub fn group_thousands(amount: Amount) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// `50000` → `"Rp50.000"` (chart annotations)
pub fn format_rupiah(amount: Amount) -> String {
    format!("Rp{}", group_thousands(amount))
}

/// `50000` → `"Rp 50.000"` (listings, tables and report prose)
pub fn format_rupiah_spaced(amount: Amount) -> String {
    format!("Rp {}", group_thousands(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), "Januari");
        assert_eq!(month_name(4), "April");
        assert_eq!(month_name(12), "Desember");
        assert_eq!(month_name(0), "");
        assert_eq!(month_name(13), "");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1.000");
        assert_eq!(group_thousands(50_000), "50.000");
        assert_eq!(group_thousands(1_250_000), "1.250.000");
    }

    #[test]
    fn test_rupiah() {
        assert_eq!(format_rupiah(50_000), "Rp50.000");
        assert_eq!(format_rupiah_spaced(70_000), "Rp 70.000");
        assert_eq!(format_rupiah(0), "Rp0");
    }
}

//! Grouping records into day, category and month buckets.
//!
//! Ordering is part of the contract:
//! - day and month buckets iterate in ascending date order
//! - category buckets iterate in first-seen order, which is also what binds
//!   each category key to its display label

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::filter::MonthFilter;
use crate::normalize::{Amount, NormalizedCategory, format_date, record_amount, record_category, record_date};
use crate::record::ExpenseRecord;

/// (year, month), ordered by year then month.
pub type MonthKey = MonthFilter;

/// Sum of amounts for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub total: Amount,
}

impl DayBucket {
    /// `dd-mm-yyyy`
    pub fn label(&self) -> String {
        format_date(self.date)
    }
}

/// Day totals in ascending date order.
///
/// Every record with a parsable date opens (or adds to) its day, so a day
/// whose only records have malformed amounts still appears with a total of 0.
/// Records without a parsable date are skipped.
pub fn by_day<'a>(records: impl IntoIterator<Item = &'a ExpenseRecord>) -> Vec<DayBucket> {
    let mut days: BTreeMap<NaiveDate, Amount> = BTreeMap::new();
    for record in records {
        let Some(date) = record_date(record) else {
            continue;
        };
        *days.entry(date).or_insert(0) += record_amount(record);
    }
    days.into_iter().map(|(date, total)| DayBucket { date, total }).collect()
}

/// Sum of amounts for one normalized category key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBucket {
    pub key: String,
    /// Label of the first record seen with this key
    pub label: String,
    pub total: Amount,
}

/// Category buckets in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CategoryTotals {
    buckets: Vec<CategoryBucket>,
    index: HashMap<String, usize>,
}

impl CategoryTotals {
    pub fn add(&mut self, category: NormalizedCategory, amount: Amount) {
        match self.index.get(&category.key) {
            Some(&i) => self.buckets[i].total += amount,
            None => {
                self.index.insert(category.key.clone(), self.buckets.len());
                self.buckets.push(CategoryBucket {
                    key: category.key,
                    label: category.display,
                    total: amount,
                });
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&CategoryBucket> {
        self.index.get(key).map(|&i| &self.buckets[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryBucket> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total(&self) -> Amount {
        self.buckets.iter().map(|b| b.total).sum()
    }

    /// Buckets sorted by amount, largest first; ties keep first-seen order.
    pub fn sorted_desc(&self) -> Vec<&CategoryBucket> {
        let mut sorted: Vec<&CategoryBucket> = self.buckets.iter().collect();
        sorted.sort_by(|a, b| b.total.cmp(&a.total));
        sorted
    }
}

impl<'a> IntoIterator for &'a CategoryTotals {
    type Item = &'a CategoryBucket;
    type IntoIter = std::slice::Iter<'a, CategoryBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Category totals, optionally restricted to one month.
///
/// With a filter, records whose date does not parse are excluded; without
/// one, every record counts regardless of its date.
pub fn by_category<'a>(
    records: impl IntoIterator<Item = &'a ExpenseRecord>,
    month: Option<MonthFilter>,
) -> CategoryTotals {
    let mut totals = CategoryTotals::default();
    for record in records {
        if let Some(month) = month {
            match record_date(record) {
                Some(date) if month.matches(date) => {}
                _ => continue,
            }
        }
        totals.add(record_category(record), record_amount(record));
    }
    totals
}

/// All records of one month plus their sum.
#[derive(Debug, Clone, Default)]
pub struct MonthBucket<'a> {
    /// In snapshot order
    pub records: Vec<&'a ExpenseRecord>,
    pub total: Amount,
}

/// Month buckets over the whole snapshot, ascending by (year, month).
///
/// Never takes a filter: the multi-month report needs every month. Records
/// without a parsable date belong to no month.
pub fn by_month(records: &[ExpenseRecord]) -> BTreeMap<MonthKey, MonthBucket<'_>> {
    let mut months: BTreeMap<MonthKey, MonthBucket<'_>> = BTreeMap::new();
    for record in records {
        let Some(date) = record_date(record) else {
            continue;
        };
        let bucket = months.entry(MonthKey::containing(date)).or_default();
        bucket.records.push(record);
        bucket.total += record_amount(record);
    }
    months
}

/// Records dated within `month`, in snapshot order.
pub fn records_in_month(records: &[ExpenseRecord], month: MonthFilter) -> Vec<&ExpenseRecord> {
    records
        .iter()
        .filter(|r| record_date(r).is_some_and(|d| month.matches(d)))
        .collect()
}

pub fn total<'a>(records: impl IntoIterator<Item = &'a ExpenseRecord>) -> Amount {
    records.into_iter().map(record_amount).sum()
}

/// The day with the highest total, with the records that made it up.
#[derive(Debug, Clone)]
pub struct PeakDay<'a> {
    pub date: NaiveDate,
    pub total: Amount,
    pub records: Vec<&'a ExpenseRecord>,
}

/// Highest-spending day among `records`.
///
/// Ties go to the day that appears first in snapshot order. Records without
/// a parsable date are ignored.
pub fn peak_day<'a>(records: &[&'a ExpenseRecord]) -> Option<PeakDay<'a>> {
    let mut days: Vec<PeakDay<'a>> = Vec::new();
    for &record in records {
        let Some(date) = record_date(record) else {
            continue;
        };
        let amount = record_amount(record);
        match days.iter_mut().find(|d| d.date == date) {
            Some(day) => {
                day.total += amount;
                day.records.push(record);
            }
            None => days.push(PeakDay {
                date,
                total: amount,
                records: vec![record],
            }),
        }
    }

    let mut best: Option<PeakDay<'a>> = None;
    for day in days {
        if best.as_ref().is_none_or(|b| day.total > b.total) {
            best = Some(day);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, category: &str, amount: &str) -> ExpenseRecord {
        ExpenseRecord::new(date, category, amount, "")
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_sorted_by_date_not_by_string() {
        let records = vec![
            rec("02-05-2025", "A", "10"),
            rec("15-04-2025", "A", "20"),
            rec("01-05-2025", "A", "30"),
        ];
        let days = by_day(&records);
        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![ymd(2025, 4, 15), ymd(2025, 5, 1), ymd(2025, 5, 2)]);
    }

    #[test]
    fn test_same_day_is_summed_and_bad_dates_skipped() {
        let records = vec![
            rec("05-04-2025", "A", "50.000"),
            rec("5-4-2025", "B", "20000"),
            rec("not a date", "C", "99999"),
            rec("06-04-2025", "A", "abc"),
        ];
        let days = by_day(&records);
        assert_eq!(
            days,
            vec![
                DayBucket { date: ymd(2025, 4, 5), total: 70_000 },
                DayBucket { date: ymd(2025, 4, 6), total: 0 },
            ]
        );
        assert_eq!(days[0].label(), "05-04-2025");
    }

    #[test]
    fn test_first_seen_label_wins() {
        let records = vec![
            rec("01-04-2025", " makanan", "100"),
            rec("02-04-2025", "MAKANAN", "200"),
            rec("03-04-2025", "Transport", "50"),
        ];
        let totals = by_category(&records, None);
        assert_eq!(totals.len(), 2);
        let makanan = totals.get("makanan").unwrap();
        assert_eq!(makanan.label, "Makanan");
        assert_eq!(makanan.total, 300);
        let keys: Vec<&str> = totals.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["makanan", "transport"]);
    }

    #[test]
    fn test_month_filter_excludes_other_months_and_bad_dates() {
        let records = vec![
            rec("01-04-2025", "A", "100"),
            rec("01-05-2025", "B", "200"),
            rec("garbage", "C", "300"),
        ];
        let april = by_category(&records, Some(MonthFilter::new(2025, 4)));
        assert_eq!(april.len(), 1);
        assert_eq!(april.total(), 100);

        let all = by_category(&records, None);
        assert_eq!(all.len(), 3);
        assert_eq!(all.total(), 600);
    }

    #[test]
    fn test_day_and_category_sums_agree() {
        let records = vec![
            rec("01-04-2025", "A", "1.000"),
            rec("01-04-2025", "B", "2.500"),
            rec("09-06-2025", "A", "700"),
            rec("30-12-2024", "C", "12,000"),
        ];
        let day_sum: Amount = by_day(&records).iter().map(|d| d.total).sum();
        assert_eq!(day_sum, by_category(&records, None).total());
        assert_eq!(day_sum, total(&records));
    }

    #[test]
    fn test_sorted_desc_is_stable() {
        let records = vec![
            rec("01-04-2025", "A", "100"),
            rec("01-04-2025", "B", "300"),
            rec("01-04-2025", "C", "100"),
        ];
        let totals = by_category(&records, None);
        let order: Vec<&str> = totals.sorted_desc().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_months_cover_exactly_the_dated_records() {
        let records = vec![
            rec("01-05-2025", "A", "200"),
            rec("15-04-2025", "A", "100"),
            rec("bad", "A", "999"),
            rec("20-05-2025", "B", "50"),
        ];
        let months = by_month(&records);
        let keys: Vec<MonthKey> = months.keys().copied().collect();
        assert_eq!(keys, vec![MonthKey::new(2025, 4), MonthKey::new(2025, 5)]);
        let may = &months[&MonthKey::new(2025, 5)];
        assert_eq!(may.records.len(), 2);
        assert_eq!(may.total, 250);
    }

    #[test]
    fn test_records_in_month_keeps_snapshot_order() {
        let records = vec![
            rec("03-04-2025", "A", "1"),
            rec("01-05-2025", "B", "2"),
            rec("01-04-2025", "C", "3"),
        ];
        let april = records_in_month(&records, MonthFilter::new(2025, 4));
        let cats: Vec<&str> = april.iter().map(|r| r.category_or_dash()).collect();
        assert_eq!(cats, vec!["A", "C"]);
    }

    #[test]
    fn test_peak_day_picks_highest_total() {
        let records = vec![
            rec("01-04-2025", "A", "100"),
            rec("02-04-2025", "B", "80"),
            rec("02-04-2025", "C", "80"),
        ];
        let refs: Vec<&ExpenseRecord> = records.iter().collect();
        let peak = peak_day(&refs).unwrap();
        assert_eq!(peak.date, ymd(2025, 4, 2));
        assert_eq!(peak.total, 160);
        assert_eq!(peak.records.len(), 2);
    }

    #[test]
    fn test_peak_day_ties_go_to_first_seen() {
        let records = vec![rec("09-04-2025", "A", "100"), rec("01-04-2025", "B", "100")];
        let refs: Vec<&ExpenseRecord> = records.iter().collect();
        assert_eq!(peak_day(&refs).unwrap().date, ymd(2025, 4, 9));
        assert!(peak_day(&[]).is_none());
    }
}

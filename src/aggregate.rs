use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Days, Months, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::{format_count, format_number, Field, SaleRecord};
use crate::error::{Result, SalesError};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Measure used to rank rows of an aggregate table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Revenue,
    Count,
}

/// A row of an aggregate table carrying sum(price) and count(rows)
pub trait Measured {
    fn revenue(&self) -> f64;
    fn count(&self) -> usize;

    fn measure(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Revenue => self.revenue(),
            Measure::Count => self.count() as f64,
        }
    }
}

/// Revenue and sale count for one categorical key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub revenue: f64,
    pub count: usize,
}

/// Revenue for one purchase location, with the coordinates of the first
/// record seen for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRevenue {
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub revenue: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    /// First day of the month
    pub month: NaiveDate,
    pub year: i32,
    pub month_name: String,
    pub revenue: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerTicket {
    pub seller: String,
    pub average_ticket: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingCount {
    pub rating: u8,
    pub count: usize,
}

macro_rules! impl_measured {
    ($($ty:ty),*) => {
        $(impl Measured for $ty {
            fn revenue(&self) -> f64 {
                self.revenue
            }

            fn count(&self) -> usize {
                self.count
            }
        })*
    };
}

impl_measured!(GroupTotal, RegionRevenue, MonthlyRevenue, DailyRevenue);

/// Revenue summed over a grid of two categorical columns. Missing cells are 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub row_field: Field,
    pub column_field: Field,
    /// Sorted row keys
    pub rows: Vec<String>,
    /// Sorted column keys
    pub columns: Vec<String>,
    /// `values[row][column]`
    pub values: Vec<Vec<f64>>,
}

impl PivotTable {
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let r = self.rows.iter().position(|k| k == row)?;
        let c = self.columns.iter().position(|k| k == column)?;
        Some(self.values[r][c])
    }

    pub fn total(&self) -> f64 {
        self.values.iter().flatten().fold(0.0, |acc, v| acc + v)
    }
}

/// Headline metrics for a set of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    pub total_revenue: f64,
    pub sale_count: usize,
    /// Mean price, `None` on empty input
    pub average_ticket: Option<f64>,
    /// Mean freight, `None` on empty input
    pub average_freight: Option<f64>,
}

/// Summary metrics rendered for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedSummary {
    pub total_revenue: String,
    pub sale_count: String,
    pub average_ticket: String,
    pub average_freight: String,
}

impl SalesSummary {
    /// Render with the scale formatter. Missing averages show as zero.
    pub fn formatted(&self, prefix: &str) -> FormattedSummary {
        FormattedSummary {
            total_revenue: format_number(self.total_revenue, prefix),
            sale_count: format_count(self.sale_count),
            average_ticket: format_number(self.average_ticket.unwrap_or(0.0), prefix),
            average_freight: format_number(self.average_freight.unwrap_or(0.0), prefix),
        }
    }
}

pub fn summary(records: &[SaleRecord]) -> SalesSummary {
    // an empty f64 sum() is -0.0
    let total_revenue = records.iter().fold(0.0, |acc, r| acc + r.price);
    let total_freight = records.iter().fold(0.0, |acc, r| acc + r.freight);
    let sale_count = records.len();
    let mean = |total: f64| (sale_count > 0).then(|| total / sale_count as f64);
    SalesSummary {
        total_revenue,
        sale_count,
        average_ticket: mean(total_revenue),
        average_freight: mean(total_freight),
    }
}

/// Sort descending by `measure` and keep the first `n` rows.
///
/// The sort is stable, so ties keep their relative order.
pub fn top_n<T: Measured + Clone>(rows: &[T], measure: Measure, n: usize) -> Vec<T> {
    let mut sorted = rows.to_vec();
    sort_desc(&mut sorted, measure);
    sorted.truncate(n);
    sorted
}

fn sort_desc<T: Measured>(rows: &mut [T], measure: Measure) {
    rows.sort_by(|a, b| b.measure(measure).total_cmp(&a.measure(measure)));
}

fn totals_by<'a, F>(records: &'a [SaleRecord], key: F) -> Vec<GroupTotal>
where
    F: Fn(&'a SaleRecord) -> &'a str,
{
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(key(record)).or_insert((0.0, 0));
        entry.0 += record.price;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(key, (revenue, count))| GroupTotal {
            key: key.to_string(),
            revenue,
            count,
        })
        .collect()
}

fn categorical(field: Field) -> Result<Field> {
    if field.is_categorical() {
        Ok(field)
    } else {
        Err(SalesError::NotCategorical(field))
    }
}

/// Revenue and count per value of a categorical column, keys sorted
pub fn group_by(records: &[SaleRecord], field: Field) -> Result<Vec<GroupTotal>> {
    let field = categorical(field)?;
    Ok(totals_by(records, |r| r.text(field).unwrap_or_default()))
}

/// Row count per value of a categorical column, most frequent first
pub fn count_by(records: &[SaleRecord], field: Field) -> Result<Vec<GroupTotal>> {
    let mut totals = group_by(records, field)?;
    sort_desc(&mut totals, Measure::Count);
    Ok(totals)
}

/// Revenue per purchase location, highest first
pub fn revenue_by_region(records: &[SaleRecord]) -> Vec<RegionRevenue> {
    let mut regions: Vec<RegionRevenue> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(record.location.as_str()).or_insert_with(|| {
            regions.push(RegionRevenue {
                region: record.location.clone(),
                latitude: record.latitude,
                longitude: record.longitude,
                revenue: 0.0,
                count: 0,
            });
            regions.len() - 1
        });
        regions[slot].revenue += record.price;
        regions[slot].count += 1;
    }

    sort_desc(&mut regions, Measure::Revenue);
    debug!("Revenue by region: {} regions", regions.len());
    regions
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Revenue per calendar month, chronological.
///
/// Months between the first and last sale with no sales are included with
/// zero revenue.
pub fn revenue_by_month(records: &[SaleRecord]) -> Vec<MonthlyRevenue> {
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(month_start(record.purchase_date)).or_insert((0.0, 0));
        entry.0 += record.price;
        entry.1 += 1;
    }

    let (Some(&first), Some(&last)) = (sums.keys().next(), sums.keys().next_back()) else {
        return Vec::new();
    };

    let mut months = Vec::new();
    let mut month = first;
    while month <= last {
        let (revenue, count) = sums.get(&month).copied().unwrap_or((0.0, 0));
        months.push(MonthlyRevenue {
            month,
            year: month.year(),
            month_name: MONTH_NAMES[month.month0() as usize].to_string(),
            revenue,
            count,
        });
        match month.checked_add_months(Months::new(1)) {
            Some(next) => month = next,
            None => break,
        }
    }
    months
}

/// Revenue per purchase date, chronological. Days without sales are omitted.
pub fn revenue_by_date(records: &[SaleRecord]) -> Vec<DailyRevenue> {
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(record.purchase_date).or_insert((0.0, 0));
        entry.0 += record.price;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(date, (revenue, count))| DailyRevenue {
            date,
            revenue,
            count,
        })
        .collect()
}

/// Revenue per product category, highest first
pub fn revenue_by_category(records: &[SaleRecord]) -> Vec<GroupTotal> {
    let mut totals = totals_by(records, |r| r.category.as_str());
    sort_desc(&mut totals, Measure::Revenue);
    totals
}

/// Revenue and sale count per seller, sorted by seller name
pub fn revenue_by_seller(records: &[SaleRecord]) -> Vec<GroupTotal> {
    totals_by(records, |r| r.seller.as_str())
}

/// Revenue and count per payment type, sorted by payment type
pub fn revenue_by_payment_type(records: &[SaleRecord]) -> Vec<GroupTotal> {
    totals_by(records, |r| r.payment_type.as_str())
}

/// Best-selling products by number of sales
pub fn top_products(records: &[SaleRecord], n: usize) -> Vec<GroupTotal> {
    let totals = totals_by(records, |r| r.product.as_str());
    top_n(&totals, Measure::Count, n)
}

/// Mean price per seller, highest first
pub fn average_ticket_by_seller(records: &[SaleRecord]) -> Vec<SellerTicket> {
    let mut tickets: Vec<SellerTicket> = revenue_by_seller(records)
        .into_iter()
        .map(|total| SellerTicket {
            average_ticket: total.revenue / total.count as f64,
            seller: total.key,
        })
        .collect();
    tickets.sort_by(|a, b| b.average_ticket.total_cmp(&a.average_ticket));
    tickets
}

/// Number of sales per customer rating, lowest rating first
pub fn rating_distribution(records: &[SaleRecord]) -> Vec<RatingCount> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.rating).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(rating, count)| RatingCount { rating, count })
        .collect()
}

/// Revenue summed per (row value, column value) pair of two categorical columns
pub fn pivot_revenue(
    records: &[SaleRecord],
    row_field: Field,
    column_field: Field,
) -> Result<PivotTable> {
    let row_field = categorical(row_field)?;
    let column_field = categorical(column_field)?;

    let row_keys: BTreeSet<&str> = records.iter().filter_map(|r| r.text(row_field)).collect();
    let column_keys: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.text(column_field))
        .collect();
    let row_index: HashMap<&str, usize> = row_keys
        .iter()
        .enumerate()
        .map(|(i, k)| (*k, i))
        .collect();
    let column_index: HashMap<&str, usize> = column_keys
        .iter()
        .enumerate()
        .map(|(i, k)| (*k, i))
        .collect();

    let mut values = vec![vec![0.0; column_keys.len()]; row_keys.len()];
    for record in records {
        let (Some(row), Some(column)) = (record.text(row_field), record.text(column_field)) else {
            continue;
        };
        if let (Some(&r), Some(&c)) = (row_index.get(row), column_index.get(column)) {
            values[r][c] += record.price;
        }
    }

    Ok(PivotTable {
        row_field,
        column_field,
        rows: row_keys.into_iter().map(str::to_string).collect(),
        columns: column_keys.into_iter().map(str::to_string).collect(),
        values,
    })
}

/// Revenue heatmap of purchase location by product category
pub fn revenue_by_region_and_category(records: &[SaleRecord]) -> Result<PivotTable> {
    pivot_revenue(records, Field::Location, Field::Category)
}

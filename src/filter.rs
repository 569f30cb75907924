use std::collections::BTreeSet;

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::{Field, SaleRecord};

/// Closed price interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Closed date interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// User-selected constraints, combined with logical AND.
///
/// An empty selection set or an unset range imposes no restriction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub sellers: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub products: BTreeSet<String>,
    pub payment_types: BTreeSet<String>,
    pub price_range: Option<PriceRange>,
    pub date_range: Option<DateRange>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.sellers.insert(seller.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    #[must_use]
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.products.insert(product.into());
        self
    }

    #[must_use]
    pub fn with_payment_type(mut self, payment_type: impl Into<String>) -> Self {
        self.payment_types.insert(payment_type.into());
        self
    }

    #[must_use]
    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = Some(PriceRange::new(min, max));
        self
    }

    #[must_use]
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    /// True when no constraint is active (matches every record)
    pub fn is_empty(&self) -> bool {
        self.selections().iter().all(|(_, set)| set.is_empty())
            && self.price_range.is_none()
            && self.date_range.is_none()
    }

    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.violated(record).is_none()
    }

    /// First active constraint the record fails, if any
    pub fn violated(&self, record: &SaleRecord) -> Option<Field> {
        for (field, selected) in self.selections() {
            if selected.is_empty() {
                continue;
            }
            let value = record.text(field).unwrap_or_default();
            if !selected.contains(value) {
                return Some(field);
            }
        }

        if let Some(range) = self.price_range {
            if !range.contains(record.price) {
                return Some(Field::Price);
            }
        }

        if let Some(range) = self.date_range {
            if !range.contains(record.purchase_date) {
                return Some(Field::PurchaseDate);
            }
        }

        None
    }

    fn selections(&self) -> [(Field, &BTreeSet<String>); 4] {
        [
            (Field::Seller, &self.sellers),
            (Field::Category, &self.categories),
            (Field::Product, &self.products),
            (Field::PaymentType, &self.payment_types),
        ]
    }
}

/// Keep the records matching every active constraint, in original order
pub fn apply_filters(dataset: &[SaleRecord], criteria: &FilterCriteria) -> Vec<SaleRecord> {
    let filtered: Vec<SaleRecord> = dataset
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect();
    debug!("Filter kept {} of {} records", filtered.len(), dataset.len());
    filtered
}

/// Full price interval of the dataset, `None` when empty
pub fn price_bounds(records: &[SaleRecord]) -> Option<PriceRange> {
    let mut prices = records.iter().map(|r| r.price);
    let first = prices.next()?;
    let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
    Some(PriceRange::new(min, max))
}

/// Full date interval of the dataset, `None` when empty
pub fn date_bounds(records: &[SaleRecord]) -> Option<DateRange> {
    let start = records.iter().map(|r| r.purchase_date).min()?;
    let end = records.iter().map(|r| r.purchase_date).max()?;
    Some(DateRange::new(start, end))
}

//! Filtering, aggregation and number formatting behind a sales analytics
//! dashboard.
//!
//! The crate takes an in-memory list of [`SaleRecord`]s, narrows it with
//! [`FilterCriteria`] and derives the aggregate tables, summary metrics and
//! chart payloads a dashboard renders. Loading the dataset and drawing the
//! charts are left to the caller.
//!
//! ```no_run
//! use sales_dashboard::{Dashboard, DashboardConfig, FilterCriteria, SaleRecord};
//!
//! let dataset: Vec<SaleRecord> = serde_json::from_str("[]").unwrap();
//! let criteria = FilterCriteria::new().with_category("livros");
//! let dashboard = Dashboard::build(&dataset, &criteria, &DashboardConfig::default()).unwrap();
//! println!("{}", dashboard.metrics.total_revenue);
//! ```

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod filter;
pub mod logging;
pub mod stats;

#[cfg(test)]
mod testutil;

pub use aggregate::{top_n, GroupTotal, Measure, Measured, PivotTable, SalesSummary};
pub use chart::{ChartData, ChartType};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, SellerBreakdown};
pub use data::{format_number, Field, SaleRecord};
pub use error::{Result, SalesError};
pub use filter::{apply_filters, DateRange, FilterCriteria, PriceRange};

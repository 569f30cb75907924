pub mod format;
pub mod model;

pub use format::{format_count, format_number};
pub use model::{parse_date, Field, SaleRecord};

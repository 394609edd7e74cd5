pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod utils;

pub use config::cli::{Cli, Command};
pub use domain::advisor::{price_for_margin, price_for_roi, RoiBasis};
pub use domain::engine::{compute_costs, compute_costs_with_table};
pub use domain::freight::FreightRateTable;
pub use domain::model::{CostBreakdown, ParameterSet, ProductRecord, Route};
pub use domain::money::parse_amount;
pub use utils::error::{PricingError, Result};

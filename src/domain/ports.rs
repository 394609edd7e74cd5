//! Collaborator seams. The engine itself only ever sees plain records and
//! parameter values; these traits are how the surrounding commands reach
//! persistence and the currency-rate source.

use crate::domain::model::ProductRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Catalog persistence. Implementations range from a flat CSV file to a
/// hosted table; commands neither know nor care which.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Loads every record. An absent backing file yields an empty catalog.
    async fn load(&self) -> Result<Vec<ProductRecord>>;

    /// Replaces the stored catalog with `records`.
    async fn save(&self, records: &[ProductRecord]) -> Result<()>;

    /// Updates one record's sale price, keyed by `ean` when the record has
    /// one and by `title` otherwise. Returns `false` when nothing matched.
    async fn update_sale_price(&self, record: &ProductRecord, new_price: f64) -> Result<bool>;
}

/// A fetched conversion rate and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    pub rate: f64,
    pub source: String,
}

/// Supplies the USD→EUR rate. A `None` means every provider declined and
/// callers fall back to a fixed default; the engine itself never fetches.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn usd_eur(&self) -> Option<RateQuote>;
}

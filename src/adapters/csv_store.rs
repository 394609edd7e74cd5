//! Flat-file catalog store: one CSV file with a fixed column set.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::model::ProductRecord;
use crate::domain::money::parse_amount;
use crate::domain::ports::CatalogStore;
use crate::utils::error::Result;

/// The catalog's fixed column set, in storage order. The import boundary
/// requires all of these except `raw_cost_usd`.
pub const CATALOG_COLUMNS: [&str; 17] = [
    "title",
    "ean",
    "sku",
    "sale_price",
    "raw_cost",
    "raw_cost_usd",
    "package_size",
    "hub_receiving",
    "hub_packaging",
    "hub_pick_pack",
    "hub_storage",
    "hub_first_mile",
    "hub_outbound",
    "hub_freight_override",
    "express_freight",
    "customs_fee",
    "direct_freight_override",
];

pub(crate) fn cell<'a>(
    headers: &csv::StringRecord,
    row: &'a csv::StringRecord,
    name: &str,
) -> &'a str {
    headers
        .iter()
        .position(|header| header == name)
        .and_then(|index| row.get(index))
        .unwrap_or("")
}

/// Builds a record from a CSV row, resolving columns by header name. Every
/// monetary cell goes through the fail-open parser, so a row from a half
/// filled spreadsheet still produces a usable record.
pub fn record_from_row(headers: &csv::StringRecord, row: &csv::StringRecord) -> ProductRecord {
    let text = |name: &str| cell(headers, row, name).trim().to_string();
    let amount = |name: &str| parse_amount(cell(headers, row, name));

    ProductRecord {
        title: text("title"),
        ean: text("ean"),
        sku: text("sku"),
        sale_price: amount("sale_price"),
        raw_cost: amount("raw_cost"),
        raw_cost_usd: amount("raw_cost_usd"),
        package_size: amount("package_size"),
        hub_receiving: amount("hub_receiving"),
        hub_packaging: amount("hub_packaging"),
        hub_pick_pack: amount("hub_pick_pack"),
        hub_storage: amount("hub_storage"),
        hub_first_mile: amount("hub_first_mile"),
        hub_outbound: amount("hub_outbound"),
        hub_freight_override: amount("hub_freight_override"),
        express_freight: amount("express_freight"),
        customs_fee: amount("customs_fee"),
        direct_freight_override: amount("direct_freight_override"),
    }
}

pub(crate) fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Serializes a record back into the fixed column order.
pub fn row_from_record(record: &ProductRecord) -> Vec<String> {
    vec![
        record.title.clone(),
        record.ean.clone(),
        record.sku.clone(),
        format_amount(record.sale_price),
        format_amount(record.raw_cost),
        format_amount(record.raw_cost_usd),
        format_amount(record.package_size),
        format_amount(record.hub_receiving),
        format_amount(record.hub_packaging),
        format_amount(record.hub_pick_pack),
        format_amount(record.hub_storage),
        format_amount(record.hub_first_mile),
        format_amount(record.hub_outbound),
        format_amount(record.hub_freight_override),
        format_amount(record.express_freight),
        format_amount(record.customs_fee),
        format_amount(record.direct_freight_override),
    ]
}

#[derive(Debug, Clone)]
pub struct CsvCatalog {
    path: PathBuf,
}

impl CsvCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Vec<ProductRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(record_from_row(&headers, &row));
        }
        Ok(records)
    }

    fn write_records(&self, records: &[ProductRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(CATALOG_COLUMNS)?;
        for record in records {
            writer.write_record(row_from_record(record))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for CsvCatalog {
    async fn load(&self) -> Result<Vec<ProductRecord>> {
        self.read_records()
    }

    async fn save(&self, records: &[ProductRecord]) -> Result<()> {
        self.write_records(records)
    }

    async fn update_sale_price(&self, record: &ProductRecord, new_price: f64) -> Result<bool> {
        let mut records = self.read_records()?;
        let mut updated = false;
        for stored in records.iter_mut() {
            let matched = if record.has_ean() {
                stored.ean.trim() == record.ean.trim()
            } else {
                stored.title == record.title
            };
            if matched {
                stored.sale_price = new_price;
                updated = true;
            }
        }
        if updated {
            self.write_records(&records)?;
        }
        Ok(updated)
    }
}

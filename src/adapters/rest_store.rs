//! Hosted-table catalog store.
//!
//! Speaks the PostgREST dialect (`/rest/v1/products` with `apikey` and
//! bearer headers), which is what the hosted backend exposes. The table
//! stores every cell as text, so amounts are parsed with the same fail-open
//! chokepoint as CSV cells and written back as formatted strings.

use std::collections::BTreeSet;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::adapters::csv_store::format_amount;
use crate::domain::model::ProductRecord;
use crate::domain::money::parse_value;
use crate::domain::ports::CatalogStore;
use crate::utils::error::Result;

const INSERT_CHUNK: usize = 500;

#[derive(Debug, Clone)]
pub struct RestCatalog {
    client: Client,
    base_url: String,
    api_key: String,
}

fn text_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Builds a record from one hosted-table row; loosely-typed cells (string or
/// number) all run through the money parser.
fn record_from_json(row: &serde_json::Map<String, Value>) -> ProductRecord {
    let text = |name: &str| text_value(row.get(name));
    let amount = |name: &str| row.get(name).map(parse_value).unwrap_or(0.0);

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

fn json_row(record: &ProductRecord) -> Value {
    serde_json::json!({
        "title": record.title,
        "ean": record.ean,
        "sku": record.sku,
        "sale_price": format_amount(record.sale_price),
        "raw_cost": format_amount(record.raw_cost),
        "raw_cost_usd": format_amount(record.raw_cost_usd),
        "package_size": format_amount(record.package_size),
        "hub_receiving": format_amount(record.hub_receiving),
        "hub_packaging": format_amount(record.hub_packaging),
        "hub_pick_pack": format_amount(record.hub_pick_pack),
        "hub_storage": format_amount(record.hub_storage),
        "hub_first_mile": format_amount(record.hub_first_mile),
        "hub_outbound": format_amount(record.hub_outbound),
        "hub_freight_override": format_amount(record.hub_freight_override),
        "express_freight": format_amount(record.express_freight),
        "customs_fee": format_amount(record.customs_fee),
        "direct_freight_override": format_amount(record.direct_freight_override),
    })
}

impl RestCatalog {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/products", self.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn fetch_rows(&self) -> Result<Vec<serde_json::Map<String, Value>>> {
        let rows = self
            .authed(self.client.get(self.endpoint()))
            .query(&[("select", "*")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(rows)
    }

    async fn delete_in(&self, column: &str, values: &BTreeSet<String>) -> Result<()> {
        let quoted: Vec<String> = values
            .iter()
            .map(|value| format!("\"{}\"", value.replace('"', "")))
            .collect();
        self.authed(self.client.delete(self.endpoint()))
            .query(&[(column, format!("in.({})", quoted.join(",")))])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for RestCatalog {
    async fn load(&self) -> Result<Vec<ProductRecord>> {
        let rows = self.fetch_rows().await?;
        Ok(rows.iter().map(record_from_json).collect())
    }

    async fn save(&self, records: &[ProductRecord]) -> Result<()> {
        // Mirror strategy: clear every key the table or the new catalog
        // knows about, then insert the new rows in bulk.
        let existing = self.fetch_rows().await?;

        let mut eans: BTreeSet<String> = BTreeSet::new();
        let mut titles: BTreeSet<String> = BTreeSet::new();
        for row in &existing {
            let ean = text_value(row.get("ean"));
            if !ean.is_empty() {
                eans.insert(ean);
            } else {
                let title = text_value(row.get("title"));
                if !title.is_empty() {
                    titles.insert(title);
                }
            }
        }
        for record in records {
            if record.has_ean() {
                eans.insert(record.ean.trim().to_string());
            } else if !record.title.trim().is_empty() {
                titles.insert(record.title.trim().to_string());
            }
        }

        if !eans.is_empty() {
            self.delete_in("ean", &eans).await?;
        }
        if !titles.is_empty() {
            self.delete_in("title", &titles).await?;
        }

        for chunk in records.chunks(INSERT_CHUNK) {
            let body: Vec<Value> = chunk.iter().map(json_row).collect();
            self.authed(self.client.post(self.endpoint()))
                .json(&body)
                .send()
                .await?
                .error_for_status()?;
        }

        tracing::debug!("synced {} records to hosted table", records.len());
        Ok(())
    }

    async fn update_sale_price(&self, record: &ProductRecord, new_price: f64) -> Result<bool> {
        let (column, key) = if record.has_ean() {
            ("ean", record.ean.trim().to_string())
        } else {
            ("title", record.title.clone())
        };

        let updated: Vec<Value> = self
            .authed(self.client.patch(self.endpoint()))
            .query(&[(column, format!("eq.{}", key))])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "sale_price": format_amount(new_price) }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(!updated.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_json_mixed_cell_types() {
        let row = serde_json::json!({
            "title": "  World Map ",
            "ean": 8684000000001_i64,
            "sale_price": "€49,90",
            "raw_cost": 10.5,
            "package_size": "2.5",
        });
        let record = record_from_json(row.as_object().unwrap());
        assert_eq!(record.title, "World Map");
        assert_eq!(record.ean, "8684000000001");
        assert_eq!(record.sale_price, 49.90);
        assert_eq!(record.raw_cost, 10.5);
        assert_eq!(record.package_size, 2.5);
        assert_eq!(record.hub_outbound, 0.0);
    }

    #[test]
    fn test_json_row_stores_text_cells() {
        let record = ProductRecord {
            title: "Mug".to_string(),
            sale_price: 12.5,
            ..Default::default()
        };
        let row = json_row(&record);
        assert_eq!(row["sale_price"], "12.50");
        assert_eq!(row["title"], "Mug");
    }
}

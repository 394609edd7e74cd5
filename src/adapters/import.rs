//! Bulk import/export boundary.
//!
//! Import is deliberately stricter than the engine: the engine zeroes
//! anything it cannot read, but a file crossing this boundary is validated
//! column-by-column and row-by-row, and a structurally invalid file is
//! rejected as a whole with an enumerated defect list. Export writes the
//! catalog back out enriched with computed columns.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use zip::write::{FileOptions, ZipWriter};

use crate::adapters::csv_store::{cell, format_amount, record_from_row, row_from_record, CATALOG_COLUMNS};
use crate::domain::model::{CostBreakdown, ParameterSet, ProductRecord};
use crate::domain::money::parse_amount_strict;
use crate::utils::error::{ImportReport, PricingError, Result, RowDefect};

/// Columns a file must carry to be importable. `raw_cost_usd` is the only
/// optional one; catalogs without a secondary-currency cost are common.
pub const REQUIRED_COLUMNS: [&str; 16] = [
    "title",
    "ean",
    "sku",
    "sale_price",
    "raw_cost",
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

/// Numeric cells that must parse if non-empty.
const NUMERIC_SANITY_COLUMNS: [&str; 3] = ["sale_price", "raw_cost", "package_size"];

/// Cells that must not be empty.
const REQUIRED_NON_EMPTY_COLUMNS: [&str; 3] = ["title", "sale_price", "raw_cost"];

/// Validates an uploaded catalog CSV and, when clean, parses it into
/// records. A missing required column rejects the file before any row is
/// inspected; row defects are collected across the whole file so the caller
/// can report them all at once. Row numbers in the report are 1-based data
/// rows (the header is not counted).
pub fn validate_catalog_csv<R: Read>(input: R) -> Result<Vec<ProductRecord>> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();

    let mut report = ImportReport::default();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            report.missing_columns.push(column.to_string());
        }
    }
    if !report.missing_columns.is_empty() {
        return Err(PricingError::ImportRejected(report));
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let row_number = index + 1;

        for column in NUMERIC_SANITY_COLUMNS {
            let value = cell(&headers, &row, column);
            if parse_amount_strict(value).is_none() {
                report.row_defects.push(RowDefect {
                    row: row_number,
                    column: column.to_string(),
                    reason: format!("`{}` is not a number", value.trim()),
                });
            }
        }
        for column in REQUIRED_NON_EMPTY_COLUMNS {
            if cell(&headers, &row, column).trim().is_empty() {
                report.row_defects.push(RowDefect {
                    row: row_number,
                    column: column.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }

        records.push(record_from_row(&headers, &row));
    }

    if report.is_clean() {
        Ok(records)
    } else {
        Err(PricingError::ImportRejected(report))
    }
}

/// Merges imported records into an existing catalog, deduplicating by `ean`
/// and keeping the last occurrence (imports win over existing rows).
/// Records without an `ean` are always kept.
pub fn merge_by_ean(
    existing: Vec<ProductRecord>,
    incoming: Vec<ProductRecord>,
) -> Vec<ProductRecord> {
    let mut combined = existing;
    combined.extend(incoming);

    let mut seen: HashSet<String> = HashSet::new();
    let mut kept: Vec<ProductRecord> = Vec::with_capacity(combined.len());
    for record in combined.into_iter().rev() {
        let key = record.ean.trim().to_string();
        if key.is_empty() || seen.insert(key) {
            kept.push(record);
        }
    }
    kept.reverse();
    kept
}

const COMPUTED_COLUMNS: [&str; 6] = [
    "hub_landed_cost",
    "direct_landed_cost",
    "optimal_route",
    "optimal_cost",
    "margin",
    "margin_pct",
];

/// Writes the catalog as CSV, enriched with the computed cost columns.
pub fn export_csv<W: Write>(output: W, rows: &[(ProductRecord, CostBreakdown)]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);

    let header: Vec<&str> = CATALOG_COLUMNS
        .iter()
        .chain(COMPUTED_COLUMNS.iter())
        .copied()
        .collect();
    writer.write_record(header)?;

    for (record, breakdown) in rows {
        let mut fields = row_from_record(record);
        fields.push(format_amount(breakdown.hub.landed));
        fields.push(format_amount(breakdown.direct.landed));
        fields.push(breakdown.optimal_route.label().to_string());
        fields.push(format_amount(breakdown.optimal_cost));
        fields.push(format_amount(breakdown.margin(record.sale_price)));
        fields.push(
            breakdown
                .margin_pct(record.sale_price)
                .map(|pct| format!("{:.2}", pct))
                .unwrap_or_default(),
        );
        writer.write_record(fields)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, serde::Serialize)]
struct CatalogDump<'a> {
    exported_at: String,
    parameters: &'a ParameterSet,
    products: Vec<DumpEntry<'a>>,
}

#[derive(Debug, serde::Serialize)]
struct DumpEntry<'a> {
    #[serde(flatten)]
    record: &'a ProductRecord,
    breakdown: &'a CostBreakdown,
    margin: f64,
    margin_pct: Option<f64>,
}

/// Writes the catalog plus breakdowns as a JSON document.
pub fn export_json<W: Write>(
    output: W,
    rows: &[(ProductRecord, CostBreakdown)],
    params: &ParameterSet,
) -> Result<()> {
    let dump = CatalogDump {
        exported_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        parameters: params,
        products: rows
            .iter()
            .map(|(record, breakdown)| DumpEntry {
                record,
                breakdown,
                margin: breakdown.margin(record.sale_price),
                margin_pct: breakdown.margin_pct(record.sale_price),
            })
            .collect(),
    };
    serde_json::to_writer_pretty(output, &dump)?;
    Ok(())
}

/// Writes an empty template carrying the full column set, for hand-filling.
pub fn write_template<W: Write>(output: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(CATALOG_COLUMNS)?;
    writer.flush()?;
    Ok(())
}

/// File name carrying the current timestamp, e.g. `catalog_20260826_1430.csv`.
pub fn timestamped_name(stem: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        stem,
        chrono::Local::now().format("%Y%m%d_%H%M"),
        extension
    )
}

/// Bundles the enriched CSV and the parameter set into a zip archive under
/// `dir`; returns the archive path.
pub fn export_archive(
    dir: &Path,
    rows: &[(ProductRecord, CostBreakdown)],
    params: &ParameterSet,
) -> Result<PathBuf> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    let mut csv_buffer = Vec::new();
    export_csv(&mut csv_buffer, rows)?;
    zip.start_file::<_, ()>("catalog.csv", FileOptions::default())?;
    zip.write_all(&csv_buffer)?;

    zip.start_file::<_, ()>("parameters.json", FileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(params)?.as_bytes())?;

    let cursor = zip.finish()?;

    let path = dir.join(timestamped_name("catalog", "zip"));
    std::fs::write(&path, cursor.into_inner())?;
    Ok(path)
}

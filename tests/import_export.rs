use std::fs::File;
use std::io::Read;

use anyhow::Result;
use route_pricer::adapters::import::{
    export_archive, export_csv, export_json, merge_by_ean, validate_catalog_csv, write_template,
};
use route_pricer::{compute_costs, ParameterSet, PricingError, ProductRecord};
use tempfile::TempDir;

const HEADER: &str = "title,ean,sku,sale_price,raw_cost,package_size,hub_receiving,\
hub_packaging,hub_pick_pack,hub_storage,hub_first_mile,hub_outbound,hub_freight_override,\
express_freight,customs_fee,direct_freight_override";

fn row(title: &str, ean: &str, sale_price: &str, raw_cost: &str) -> String {
    format!("{title},{ean},SKU,{sale_price},{raw_cost},2.5,0,0,0,0,0,0,0,0,0,0")
}

#[test]
fn clean_file_imports_every_row() -> Result<()> {
    let csv = format!(
        "{HEADER}\n{}\n{}\n",
        row("World Map", "868400001", "\"€49,90\"", "10.00"),
        row("Desk Mat", "868400002", "24.90", "6.50"),
    );
    let records = validate_catalog_csv(csv.as_bytes())?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].sale_price, 49.90);
    assert_eq!(records[1].raw_cost, 6.50);
    Ok(())
}

#[test]
fn missing_column_rejects_before_rows_are_read() {
    let csv = "title,ean\nWorld Map,868400001\n";
    let err = validate_catalog_csv(csv.as_bytes()).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    let PricingError::ImportRejected(report) = err else {
        panic!("expected an import rejection");
    };
    assert!(report.missing_columns.contains(&"sale_price".to_string()));
    assert!(report.row_defects.is_empty());
}

#[test]
fn defective_rows_are_all_enumerated() {
    let csv = format!(
        "{HEADER}\n{}\n{}\n{}\n",
        row("Good", "1", "10.00", "5.00"),
        row("", "2", "abc", "5.00"),
        row("Late", "3", "10.00", ""),
    );
    let err = validate_catalog_csv(csv.as_bytes()).unwrap_err();
    let PricingError::ImportRejected(report) = err else {
        panic!("expected an import rejection");
    };

    // row numbers are 1-based data rows; defects from both bad rows survive
    assert!(report
        .row_defects
        .iter()
        .any(|d| d.row == 2 && d.column == "sale_price"));
    assert!(report.row_defects.iter().any(|d| d.row == 2 && d.column == "title"));
    assert!(report
        .row_defects
        .iter()
        .any(|d| d.row == 3 && d.column == "raw_cost"));
}

#[test]
fn merge_prefers_incoming_rows_by_ean() {
    let old = |ean: &str, price: f64| ProductRecord {
        title: format!("old {ean}"),
        ean: ean.to_string(),
        sale_price: price,
        ..Default::default()
    };
    let existing = vec![old("1", 10.0), old("2", 20.0)];
    let incoming = vec![
        ProductRecord {
            title: "new 2".to_string(),
            ean: "2".to_string(),
            sale_price: 25.0,
            ..Default::default()
        },
        ProductRecord {
            title: "no ean".to_string(),
            ..Default::default()
        },
    ];

    let merged = merge_by_ean(existing, incoming);
    assert_eq!(merged.len(), 3);
    let two = merged.iter().find(|r| r.ean == "2").unwrap();
    assert_eq!(two.title, "new 2");
    assert_eq!(two.sale_price, 25.0);
}

fn computed_rows() -> Vec<(ProductRecord, route_pricer::CostBreakdown)> {
    let params = ParameterSet::default();
    ["Alpha", "Beta"]
        .into_iter()
        .enumerate()
        .map(|(index, title)| {
            let record = ProductRecord {
                title: title.to_string(),
                ean: format!("86840000{index}"),
                sale_price: 30.0 + index as f64,
                raw_cost: 8.0,
                package_size: 1.5,
                ..Default::default()
            };
            let breakdown = compute_costs(&record, &params);
            (record, breakdown)
        })
        .collect()
}

#[test]
fn exported_csv_carries_computed_columns() -> Result<()> {
    let mut buffer = Vec::new();
    export_csv(&mut buffer, &computed_rows())?;

    let text = String::from_utf8(buffer)?;
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("title,ean,"));
    assert!(header.ends_with("optimal_route,optimal_cost,margin,margin_pct"));

    let first = lines.next().unwrap();
    assert!(first.contains("Alpha"));
    assert!(first.contains("hub") || first.contains("direct"));
    Ok(())
}

#[test]
fn exported_json_mirrors_the_catalog() -> Result<()> {
    let mut buffer = Vec::new();
    export_json(&mut buffer, &computed_rows(), &ParameterSet::default())?;

    let dump: serde_json::Value = serde_json::from_slice(&buffer)?;
    assert_eq!(dump["products"].as_array().unwrap().len(), 2);
    assert_eq!(dump["products"][0]["title"], "Alpha");
    assert!(dump["products"][0]["breakdown"]["hub"]["landed"].is_number());
    assert!(dump["exported_at"].is_string());
    Ok(())
}

#[test]
fn archive_bundles_catalog_and_parameters() -> Result<()> {
    let dir = TempDir::new()?;
    let path = export_archive(dir.path(), &computed_rows(), &ParameterSet::default())?;
    assert!(path.extension().is_some_and(|ext| ext == "zip"));

    let mut archive = zip::ZipArchive::new(File::open(&path)?)?;
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["catalog.csv", "parameters.json"]);

    let mut parameters = String::new();
    archive
        .by_name("parameters.json")?
        .read_to_string(&mut parameters)?;
    let parsed: serde_json::Value = serde_json::from_str(&parameters)?;
    assert!(parsed["tax_pct"].is_number());
    Ok(())
}

#[test]
fn template_is_an_importable_header() -> Result<()> {
    let mut buffer = Vec::new();
    write_template(&mut buffer)?;
    let records = validate_catalog_csv(buffer.as_slice())?;
    assert!(records.is_empty());
    Ok(())
}

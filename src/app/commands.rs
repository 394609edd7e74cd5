//! Command execution. Each subcommand resolves its collaborators (store,
//! rate source, parameter set) here and leans on the domain layer for the
//! actual numbers.

use std::fs::File;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::adapters::csv_store::CsvCatalog;
use crate::adapters::fx::{LiveRates, DEFAULT_USD_EUR};
use crate::adapters::import::{
    export_archive, export_csv, export_json, merge_by_ean, timestamped_name, validate_catalog_csv,
    write_template,
};
use crate::adapters::rest_store::RestCatalog;
use crate::config::cli::{Cli, Command};
use crate::config::toml_config::Settings;
use crate::domain::advisor::{round_price, suggest_margin_price, suggest_roi_price, RoiBasis};
use crate::domain::engine::compute_costs;
use crate::domain::model::{CostBreakdown, ParameterSet, ProductRecord};
use crate::domain::ports::{CatalogStore, RateSource};
use crate::domain::report::{rank_by_margin, summarize};
use crate::utils::error::{PricingError, Result};

pub async fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.settings {
        Some(path) => Some(Settings::from_file(path)?),
        None => None,
    };

    let fetched_rate = if cli.live_rates && cli.fx_rate.is_none() {
        fetch_live_rate().await
    } else {
        None
    };
    let params = cli.parameter_set(settings.as_ref(), fetched_rate);
    debug!(?params, "resolved parameter set");

    let store = build_store(&cli, settings.as_ref());

    match &cli.command {
        Command::Report => run_report(store.as_ref(), &params).await,
        Command::Suggest {
            product,
            target_margin,
            target_roi,
            roi_basis,
            apply,
        } => {
            run_suggest(
                store.as_ref(),
                &params,
                product,
                *target_margin,
                *target_roi,
                (*roi_basis).into(),
                *apply,
            )
            .await
        }
        Command::Import { file } => run_import(store.as_ref(), file).await,
        Command::Export {
            dir,
            archive,
            template,
        } => run_export(store.as_ref(), &params, Path::new(dir), *archive, *template).await,
        Command::FetchRate => run_fetch_rate().await,
    }
}

/// Store selection: explicit `--store-url` wins, then the settings file's
/// `[store]` section, then a local CSV file.
fn build_store(cli: &Cli, settings: Option<&Settings>) -> Box<dyn CatalogStore> {
    if let Some(url) = &cli.store_url {
        let key = cli.store_key.clone().unwrap_or_default();
        info!(url, "using hosted catalog store");
        return Box::new(RestCatalog::new(url.clone(), key));
    }

    if let Some(store) = settings.and_then(|s| s.store.as_ref()) {
        if store.kind == "rest" {
            let url = store.url.clone().unwrap_or_default();
            let key = store.api_key.clone().unwrap_or_default();
            info!(url, "using hosted catalog store");
            return Box::new(RestCatalog::new(url, key));
        }
        if let Some(path) = &store.path {
            return Box::new(CsvCatalog::new(path.clone()));
        }
    }

    let path = cli.catalog.as_deref().unwrap_or("products.csv");
    Box::new(CsvCatalog::new(path))
}

async fn fetch_live_rate() -> Option<f64> {
    match LiveRates::new().usd_eur().await {
        Some(quote) => {
            info!(rate = quote.rate, source = %quote.source, "fetched USD→EUR rate");
            Some(quote.rate)
        }
        None => {
            warn!(
                fallback = DEFAULT_USD_EUR,
                "every rate provider declined, using the built-in default"
            );
            Some(DEFAULT_USD_EUR)
        }
    }
}

async fn load_breakdowns(
    store: &dyn CatalogStore,
    params: &ParameterSet,
) -> Result<Vec<(ProductRecord, CostBreakdown)>> {
    let records = store.load().await?;
    Ok(records
        .into_iter()
        .map(|record| {
            let breakdown = compute_costs(&record, params);
            (record, breakdown)
        })
        .collect())
}

async fn run_report(store: &dyn CatalogStore, params: &ParameterSet) -> Result<()> {
    let rows = load_breakdowns(store, params).await?;
    if rows.is_empty() {
        println!("catalog is empty");
        return Ok(());
    }

    println!(
        "{:<38} {:>9} {:>9} {:>9} {:>7} {:>9} {:>8}",
        "product", "price", "hub", "direct", "route", "margin", "margin%"
    );
    for index in rank_by_margin(&rows) {
        let (record, breakdown) = &rows[index];
        let margin_pct = breakdown
            .margin_pct(record.sale_price)
            .map(|pct| format!("{:.1}", pct))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<38} {:>9.2} {:>9.2} {:>9.2} {:>7} {:>9.2} {:>8}",
            truncate(&record.title, 38),
            record.sale_price,
            breakdown.hub.landed,
            breakdown.direct.landed,
            breakdown.optimal_route.label(),
            breakdown.margin(record.sale_price),
            margin_pct,
        );
    }

    let summary = summarize(&rows);
    println!();
    println!(
        "{} products, {} profitable, {} losing",
        summary.total_products, summary.profitable, summary.losing
    );
    println!("average margin: {:.1}%", summary.average_margin_pct);
    println!(
        "hub optimal for {} (saving €{:.2}), direct for {} (saving €{:.2})",
        summary.hub_route_count,
        summary.hub_route_savings,
        summary.direct_route_count,
        summary.direct_route_savings
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_suggest(
    store: &dyn CatalogStore,
    params: &ParameterSet,
    product_key: &str,
    target_margin: Option<f64>,
    target_roi: Option<f64>,
    roi_basis: RoiBasis,
    apply: bool,
) -> Result<()> {
    let records = store.load().await?;
    let record = find_product(&records, product_key)?;
    let breakdown = compute_costs(record, params);

    let suggested = if let Some(margin) = target_margin {
        suggest_margin_price(&breakdown, margin / 100.0)
    } else if let Some(roi) = target_roi {
        suggest_roi_price(record, params, &breakdown, roi, roi_basis)
    } else {
        None
    };

    let Some(price) = suggested else {
        return Err(PricingError::Config {
            message: format!(
                "no price satisfies the target for `{}` (costs leave nothing to invert)",
                record.title
            ),
        });
    };
    let price = round_price(price);

    println!("product:         {}", record.title);
    println!("current price:   €{:.2}", record.sale_price);
    println!("optimal route:   {}", breakdown.optimal_route);
    println!("landed cost:     €{:.2}", breakdown.optimal_cost);
    println!("suggested price: €{:.2}", price);

    if apply {
        let matched = store.update_sale_price(record, price).await?;
        if matched {
            info!(product = %record.title, price, "sale price updated");
            println!("sale price written back to the store");
        } else {
            warn!(product = %record.title, "write-back matched no stored record");
            println!("warning: no stored record matched, nothing written");
        }
    }
    Ok(())
}

fn find_product<'a>(records: &'a [ProductRecord], key: &str) -> Result<&'a ProductRecord> {
    let key = key.trim();
    records
        .iter()
        .find(|r| r.has_ean() && r.ean.trim() == key)
        .or_else(|| records.iter().find(|r| r.title.trim() == key))
        .ok_or_else(|| PricingError::ProductNotFound {
            key: key.to_string(),
        })
}

async fn run_import(store: &dyn CatalogStore, file: &str) -> Result<()> {
    let input = File::open(file)?;
    let incoming = validate_catalog_csv(input)?;
    let count = incoming.len();

    let existing = store.load().await?;
    let merged = merge_by_ean(existing, incoming);
    store.save(&merged).await?;

    info!(imported = count, total = merged.len(), "import complete");
    println!("imported {} rows, catalog now holds {}", count, merged.len());
    Ok(())
}

async fn run_export(
    store: &dyn CatalogStore,
    params: &ParameterSet,
    dir: &Path,
    archive: bool,
    template: bool,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    if template {
        let path = dir.join("catalog_template.csv");
        write_template(File::create(&path)?)?;
        println!("template written to {}", path.display());
        return Ok(());
    }

    let rows = load_breakdowns(store, params).await?;

    if archive {
        let path = export_archive(dir, &rows, params)?;
        println!("archive written to {}", path.display());
        return Ok(());
    }

    let csv_path = dir.join(timestamped_name("catalog", "csv"));
    export_csv(File::create(&csv_path)?, &rows)?;
    let json_path = dir.join(timestamped_name("catalog", "json"));
    export_json(File::create(&json_path)?, &rows, params)?;
    println!(
        "catalog written to {} and {}",
        csv_path.display(),
        json_path.display()
    );
    Ok(())
}

async fn run_fetch_rate() -> Result<()> {
    match LiveRates::new().usd_eur().await {
        Some(quote) => {
            println!("USD→EUR {:.4} (from {})", quote.rate, quote.source);
        }
        None => {
            println!(
                "every provider declined, built-in default is {:.2}",
                DEFAULT_USD_EUR
            );
        }
    }
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

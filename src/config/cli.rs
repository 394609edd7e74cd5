use clap::{Parser, Subcommand, ValueEnum};

use crate::config::toml_config::Settings;
use crate::domain::advisor::RoiBasis;
use crate::domain::model::ParameterSet;
use crate::utils::error::{PricingError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_non_negative, validate_positive, validate_range,
    validate_url, Validate,
};

#[derive(Debug, Parser)]
#[command(
    name = "route-pricer",
    version,
    about = "Landed-cost and margin calculator for a cross-border marketplace catalog"
)]
pub struct Cli {
    /// Fixed advertising cost per unit (€)
    #[arg(long, global = true)]
    pub ad_cost: Option<f64>,

    /// Marketplace commission in percent of sale price
    #[arg(long, global = true)]
    pub fee_pct: Option<f64>,

    /// Tax in percent of sale price
    #[arg(long, global = true)]
    pub tax_pct: Option<f64>,

    /// USD→EUR conversion rate; overrides the live fetch
    #[arg(long, global = true)]
    pub fx_rate: Option<f64>,

    /// Fetch the USD→EUR rate from the live provider chain before computing
    #[arg(long, global = true)]
    pub live_rates: bool,

    /// Catalog CSV file (ignored when a hosted store is configured)
    #[arg(long, global = true)]
    pub catalog: Option<String>,

    /// Hosted-table base URL (switches the store from CSV to REST)
    #[arg(long, global = true)]
    pub store_url: Option<String>,

    /// API key for the hosted table
    #[arg(long, global = true)]
    pub store_key: Option<String>,

    /// TOML settings file supplying defaults for the options above
    #[arg(long, global = true)]
    pub settings: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute every product's breakdown and print the catalog report
    Report,
    /// Suggest a sale price for one product from a target margin or ROI
    Suggest {
        /// EAN or title identifying the product
        #[arg(long)]
        product: String,
        /// Target margin in percent of sale price (e.g. 25)
        #[arg(long)]
        target_margin: Option<f64>,
        /// Target ROI as a fraction (e.g. 0.5 for 50%)
        #[arg(long)]
        target_roi: Option<f64>,
        /// Route whose figures feed the ROI computation
        #[arg(long, value_enum, default_value_t = RoiBasisArg::Optimal)]
        roi_basis: RoiBasisArg,
        /// Write the suggested price back to the store
        #[arg(long)]
        apply: bool,
    },
    /// Validate an uploaded catalog CSV and merge it into the store
    Import {
        /// CSV file to import
        file: String,
    },
    /// Export the catalog enriched with computed columns
    Export {
        /// Target directory
        #[arg(default_value = ".")]
        dir: String,
        /// Also bundle CSV + parameters into a zip archive
        #[arg(long)]
        archive: bool,
        /// Write an empty column template instead of data
        #[arg(long)]
        template: bool,
    },
    /// Query the live USD→EUR provider chain and print the result
    FetchRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoiBasisArg {
    Optimal,
    Hub,
    Direct,
}

impl From<RoiBasisArg> for RoiBasis {
    fn from(arg: RoiBasisArg) -> Self {
        match arg {
            RoiBasisArg::Optimal => RoiBasis::Optimal,
            RoiBasisArg::Hub => RoiBasis::Hub,
            RoiBasisArg::Direct => RoiBasis::Direct,
        }
    }
}

impl Cli {
    /// Resolves the parameter set: CLI flags win over the settings file,
    /// which wins over the built-in defaults. `fetched_rate` is the live
    /// quote, consulted only when no explicit `--fx-rate` was given.
    pub fn parameter_set(&self, settings: Option<&Settings>, fetched_rate: Option<f64>) -> ParameterSet {
        let defaults = ParameterSet::default();
        let from_settings = settings.and_then(|s| s.parameters.as_ref());

        ParameterSet {
            ad_cost_per_unit: self
                .ad_cost
                .or(from_settings.and_then(|p| p.ad_cost))
                .unwrap_or(defaults.ad_cost_per_unit),
            marketplace_fee_pct: self
                .fee_pct
                .or(from_settings.and_then(|p| p.fee_pct))
                .unwrap_or(defaults.marketplace_fee_pct),
            tax_pct: self
                .tax_pct
                .or(from_settings.and_then(|p| p.tax_pct))
                .unwrap_or(defaults.tax_pct),
            usd_eur_rate: self
                .fx_rate
                .or(fetched_rate)
                .or(from_settings.and_then(|p| p.fx_rate)),
        }
    }
}

impl Validate for Cli {
    fn validate(&self) -> Result<()> {
        if let Some(ad_cost) = self.ad_cost {
            validate_non_negative("ad_cost", ad_cost)?;
        }
        if let Some(fee_pct) = self.fee_pct {
            validate_range("fee_pct", fee_pct, 0.0, 100.0)?;
        }
        if let Some(tax_pct) = self.tax_pct {
            validate_range("tax_pct", tax_pct, 0.0, 100.0)?;
        }
        if let Some(fx_rate) = self.fx_rate {
            validate_positive("fx_rate", fx_rate)?;
        }
        if let Some(url) = &self.store_url {
            validate_url("store_url", url)?;
        }

        if let Command::Suggest {
            product,
            target_margin,
            target_roi,
            ..
        } = &self.command
        {
            validate_non_empty_string("product", product)?;
            match (target_margin, target_roi) {
                (None, None) => {
                    return Err(PricingError::Config {
                        message: "suggest needs --target-margin or --target-roi".to_string(),
                    })
                }
                (Some(_), Some(_)) => {
                    return Err(PricingError::Config {
                        message: "--target-margin and --target-roi are mutually exclusive"
                            .to_string(),
                    })
                }
                _ => {}
            }
            if let Some(margin) = target_margin {
                validate_range("target_margin", *margin, 0.0, 99.9)?;
            }
            if let Some(roi) = target_roi {
                validate_non_negative("target_roi", *roi)?;
            }
        }
        Ok(())
    }
}

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::utils::error::{PricingError, Result};
use crate::utils::validation::{validate_non_negative, validate_positive, validate_range, validate_url, Validate};

/// Optional TOML settings file; every field falls back to a built-in
/// default, so a partial file is fine.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    pub parameters: Option<ParametersSection>,
    pub store: Option<StoreSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ParametersSection {
    pub ad_cost: Option<f64>,
    pub fee_pct: Option<f64>,
    pub tax_pct: Option<f64>,
    pub fx_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct StoreSection {
    /// "csv" or "rest"
    pub kind: String,
    pub path: Option<String>,
    pub url: Option<String>,
    pub api_key: Option<String>,
}

impl Settings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        if let Some(params) = &self.parameters {
            if let Some(ad_cost) = params.ad_cost {
                validate_non_negative("parameters.ad_cost", ad_cost)?;
            }
            if let Some(fee_pct) = params.fee_pct {
                validate_range("parameters.fee_pct", fee_pct, 0.0, 100.0)?;
            }
            if let Some(tax_pct) = params.tax_pct {
                validate_range("parameters.tax_pct", tax_pct, 0.0, 100.0)?;
            }
            if let Some(fx_rate) = params.fx_rate {
                validate_positive("parameters.fx_rate", fx_rate)?;
            }
        }
        if let Some(store) = &self.store {
            store.validate()?;
        }
        Ok(())
    }
}

impl Validate for StoreSection {
    fn validate(&self) -> Result<()> {
        match self.kind.as_str() {
            "csv" => Ok(()),
            "rest" => {
                let url = self.url.as_deref().ok_or_else(|| PricingError::Config {
                    message: "store.kind = \"rest\" requires store.url".to_string(),
                })?;
                validate_url("store.url", url)?;
                if self.api_key.as_deref().map(str::is_empty).unwrap_or(true) {
                    return Err(PricingError::Config {
                        message: "store.kind = \"rest\" requires store.api_key".to_string(),
                    });
                }
                Ok(())
            }
            other => Err(PricingError::Config {
                message: format!("unknown store.kind `{other}` (expected \"csv\" or \"rest\")"),
            }),
        }
    }
}

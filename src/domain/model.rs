//! Core data model: product pricing inputs, global tunables and the fully
//! derived cost breakdown.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One catalog item's pricing inputs.
///
/// All monetary fields are canonical euro amounts; the boundary adapters run
/// every stored cell through [`crate::domain::money`] before a record
/// reaches the engine, so a missing or malformed cell shows up here as
/// `0.0` (the deliberate fail-open contract).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Display name; also the fallback update key when `ean` is blank.
    pub title: String,
    /// External article code; preferred unique key when present.
    #[serde(default)]
    pub ean: String,
    /// Internal article code.
    #[serde(default)]
    pub sku: String,

    /// Current listing price. `0.0` is a valid "unset" sentinel.
    #[serde(default)]
    pub sale_price: f64,
    /// Base unit cost in the settlement currency (€).
    #[serde(default)]
    pub raw_cost: f64,
    /// Secondary-currency unit cost (USD); used only when `raw_cost` is not
    /// positive and a conversion rate is supplied.
    #[serde(default)]
    pub raw_cost_usd: f64,
    /// Volumetric weight (desi) keying the direct-route freight table.
    #[serde(default)]
    pub package_size: f64,

    // Hub route: itemized first-segment legs plus the second-leg carrier.
    #[serde(default)]
    pub hub_receiving: f64,
    #[serde(default)]
    pub hub_packaging: f64,
    #[serde(default)]
    pub hub_pick_pack: f64,
    #[serde(default)]
    pub hub_storage: f64,
    #[serde(default)]
    pub hub_first_mile: f64,
    /// Second-leg carrier cost (hub → destination market).
    #[serde(default)]
    pub hub_outbound: f64,
    /// Manually entered first-segment total; consulted only when every
    /// itemized leg above is zero.
    #[serde(default)]
    pub hub_freight_override: f64,

    // Direct route.
    #[serde(default)]
    pub express_freight: f64,
    /// Duty / customs clearance fee on the direct route.
    #[serde(default)]
    pub customs_fee: f64,
    /// Manually entered direct freight total; last in the fallback chain.
    #[serde(default)]
    pub direct_freight_override: f64,
}

impl ProductRecord {
    pub fn has_ean(&self) -> bool {
        !self.ean.trim().is_empty()
    }

    /// Sum of the itemized hub first-segment legs.
    pub fn hub_leg_sum(&self) -> f64 {
        self.hub_receiving
            + self.hub_packaging
            + self.hub_pick_pack
            + self.hub_storage
            + self.hub_first_mile
    }

    /// Raw cost in the settlement currency, converting the secondary-currency
    /// figure with the injected rate when no euro cost is present.
    pub fn effective_raw_cost(&self, params: &ParameterSet) -> f64 {
        if self.raw_cost > 0.0 {
            return self.raw_cost;
        }
        match params.usd_eur_rate {
            Some(rate) if rate > 0.0 && self.raw_cost_usd > 0.0 => self.raw_cost_usd * rate,
            _ => self.raw_cost,
        }
    }
}

/// Global tunables applied uniformly to every product in one computation
/// pass. Constructed fresh per request and never mutated mid-pass; the
/// engine treats it as read-only, so one value can serve a whole catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Fixed advertising cost per unit (€).
    pub ad_cost_per_unit: f64,
    /// Marketplace commission, percent of sale price (0–100).
    pub marketplace_fee_pct: f64,
    /// Tax, percent of sale price (0–100).
    pub tax_pct: f64,
    /// USD→EUR conversion rate handed in by the caller; the engine never
    /// fetches rates itself.
    #[serde(default)]
    pub usd_eur_rate: Option<f64>,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            ad_cost_per_unit: 5.25,
            marketplace_fee_pct: 15.0,
            tax_pct: 20.0,
            usd_eur_rate: None,
        }
    }
}

/// Shipping route identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Multi-leg route through the fulfilment hub.
    Hub,
    /// Single-leg direct route.
    Direct,
}

impl Route {
    pub fn label(&self) -> &'static str {
        match self {
            Route::Hub => "hub",
            Route::Direct => "direct",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a route's variable freight segment was resolved, in priority order.
/// Recording the winning resolver keeps the fallback chain auditable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreightSource {
    /// Size-keyed rate table match (direct route only).
    RateTable,
    /// Sum of itemized components.
    Itemized,
    /// Manually entered total.
    Override,
    /// Nothing resolved; the segment contributes `0.0`.
    Unresolved,
}

/// One route's full cost stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteCosts {
    /// Total freight on this route.
    pub freight: f64,
    /// Which resolver produced the variable freight segment.
    pub freight_source: FreightSource,
    /// Raw cost plus freight.
    pub base_cost: f64,
    /// Base cost plus per-unit ad cost.
    pub with_ad: f64,
    /// Tax amount (proportional to sale price, identical across routes).
    pub tax: f64,
    /// Marketplace fee amount (proportional to sale price, identical across
    /// routes).
    pub fee: f64,
    /// Fully landed cost on this route.
    pub landed: f64,
}

/// Engine output for one product under one parameter set. Fully derived and
/// never persisted as source of truth; always recomputed from the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub hub: RouteCosts,
    pub direct: RouteCosts,
    /// Cheaper route by landed cost; ties favor the hub route.
    pub optimal_route: Route,
    pub optimal_cost: f64,
    /// Absolute landed-cost gap between the two routes.
    pub cost_difference: f64,
}

impl CostBreakdown {
    pub fn route(&self, route: Route) -> &RouteCosts {
        match route {
            Route::Hub => &self.hub,
            Route::Direct => &self.direct,
        }
    }

    pub fn optimal(&self) -> &RouteCosts {
        self.route(self.optimal_route)
    }

    /// Profit margin against the optimal landed cost.
    pub fn margin(&self, sale_price: f64) -> f64 {
        sale_price - self.optimal_cost
    }

    /// Margin as a percentage of sale price; `None` when the price is unset.
    pub fn margin_pct(&self, sale_price: f64) -> Option<f64> {
        if sale_price > 0.0 {
            Some(self.margin(sale_price) / sale_price * 100.0)
        } else {
            None
        }
    }
}

//! Cost & route engine.
//!
//! Pure, deterministic, no I/O and no errors: every input has already been
//! normalized by the money parser, so missing data degrades to `0.0` rather
//! than failing. The engine computes both routes' full cost stacks, picks
//! the cheaper, and leaves the result entirely with the caller. No state
//! survives between calls.

use crate::domain::freight::FreightRateTable;
use crate::domain::model::{
    CostBreakdown, FreightSource, ParameterSet, ProductRecord, Route, RouteCosts,
};

/// Evaluates freight candidates in priority order; the first one that
/// produces a value wins, which keeps the fallback precedence auditable.
fn resolve_freight(candidates: &[(FreightSource, Option<f64>)]) -> (f64, FreightSource) {
    for &(source, amount) in candidates {
        if let Some(amount) = amount {
            return (amount, source);
        }
    }
    (0.0, FreightSource::Unresolved)
}

/// Hub-route first segment: a positive itemized leg sum always wins over the
/// manual override, even when the override is larger: itemized detail is
/// authoritative whenever it exists.
fn resolve_hub_inbound(product: &ProductRecord) -> (f64, FreightSource) {
    let itemized = product.hub_leg_sum();
    let override_total = product.hub_freight_override;
    resolve_freight(&[
        (FreightSource::Itemized, (itemized > 0.0).then_some(itemized)),
        (
            FreightSource::Override,
            (override_total != 0.0).then_some(override_total),
        ),
    ])
}

/// Direct-route freight: rate-table match first, then a positive itemized
/// `express + customs` sum, then the manual override.
fn resolve_direct_freight(
    product: &ProductRecord,
    table: &FreightRateTable,
) -> (f64, FreightSource) {
    let itemized = product.express_freight + product.customs_fee;
    let override_total = product.direct_freight_override;
    resolve_freight(&[
        (FreightSource::RateTable, table.lookup(product.package_size)),
        (FreightSource::Itemized, (itemized > 0.0).then_some(itemized)),
        (
            FreightSource::Override,
            (override_total != 0.0).then_some(override_total),
        ),
    ])
}

fn route_costs(
    raw_cost: f64,
    freight: f64,
    freight_source: FreightSource,
    ad_cost: f64,
    tax: f64,
    fee: f64,
) -> RouteCosts {
    let base_cost = raw_cost + freight;
    let with_ad = base_cost + ad_cost;
    RouteCosts {
        freight,
        freight_source,
        base_cost,
        with_ad,
        tax,
        fee,
        landed: with_ad + tax + fee,
    }
}

/// Computes both routes' cost stacks for one product and picks the optimal
/// route, using the built-in carrier rate table.
pub fn compute_costs(product: &ProductRecord, params: &ParameterSet) -> CostBreakdown {
    compute_costs_with_table(product, params, &FreightRateTable::default())
}

/// Same as [`compute_costs`] with an injected rate table.
pub fn compute_costs_with_table(
    product: &ProductRecord,
    params: &ParameterSet,
    table: &FreightRateTable,
) -> CostBreakdown {
    let raw_cost = product.effective_raw_cost(params);

    // Tax and marketplace fee are proportional to the sale price, not to
    // cost, so they are computed once and identical on both routes.
    let tax = product.sale_price * params.tax_pct / 100.0;
    let fee = product.sale_price * params.marketplace_fee_pct / 100.0;

    let (hub_inbound, hub_source) = resolve_hub_inbound(product);
    let hub = route_costs(
        raw_cost,
        hub_inbound + product.hub_outbound,
        hub_source,
        params.ad_cost_per_unit,
        tax,
        fee,
    );

    let (direct_freight, direct_source) = resolve_direct_freight(product, table);
    let direct = route_costs(
        raw_cost,
        direct_freight,
        direct_source,
        params.ad_cost_per_unit,
        tax,
        fee,
    );

    let optimal_route = if hub.landed <= direct.landed {
        Route::Hub
    } else {
        Route::Direct
    };

    CostBreakdown {
        optimal_route,
        optimal_cost: hub.landed.min(direct.landed),
        cost_difference: (hub.landed - direct.landed).abs(),
        hub,
        direct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> ProductRecord {
        ProductRecord {
            title: "World Map Poster".to_string(),
            ean: "8684000000001".to_string(),
            sale_price: 50.0,
            raw_cost: 10.0,
            hub_receiving: 2.0,
            hub_packaging: 1.0,
            hub_outbound: 3.0,
            direct_freight_override: 20.0,
            ..Default::default()
        }
    }

    fn sample_params() -> ParameterSet {
        ParameterSet {
            ad_cost_per_unit: 5.0,
            marketplace_fee_pct: 15.0,
            tax_pct: 20.0,
            usd_eur_rate: None,
        }
    }

    #[test]
    fn test_worked_scenario() {
        let breakdown = compute_costs(&sample_product(), &sample_params());

        assert_eq!(breakdown.hub.tax, 10.0);
        assert_eq!(breakdown.hub.fee, 7.5);
        assert_eq!(breakdown.hub.base_cost, 16.0);
        assert_eq!(breakdown.hub.with_ad, 21.0);
        assert_eq!(breakdown.hub.landed, 38.5);

        assert_eq!(breakdown.direct.base_cost, 30.0);
        assert_eq!(breakdown.direct.with_ad, 35.0);
        assert_eq!(breakdown.direct.landed, 52.5);
        assert_eq!(breakdown.direct.freight_source, FreightSource::Override);

        assert_eq!(breakdown.optimal_route, Route::Hub);
        assert_eq!(breakdown.optimal_cost, 38.5);
        assert_eq!(breakdown.cost_difference, 14.0);
    }

    #[test]
    fn test_deterministic() {
        let product = sample_product();
        let params = sample_params();
        let first = compute_costs(&product, &params);
        let second = compute_costs(&product, &params);
        assert_eq!(first, second);
    }

    #[test]
    fn test_itemized_wins_over_override() {
        let mut product = sample_product();
        product.hub_freight_override = 99.0;
        let with_large_override = compute_costs(&product, &sample_params());
        product.hub_freight_override = 0.0;
        let without_override = compute_costs(&product, &sample_params());

        // positive itemized legs make the override irrelevant
        assert_eq!(
            with_large_override.hub.base_cost,
            without_override.hub.base_cost
        );
        assert_eq!(
            with_large_override.hub.freight_source,
            FreightSource::Itemized
        );
    }

    #[test]
    fn test_hub_override_used_when_legs_sum_to_zero() {
        let mut product = sample_product();
        product.hub_receiving = 0.0;
        product.hub_packaging = 0.0;
        product.hub_freight_override = 7.0;
        let breakdown = compute_costs(&product, &sample_params());

        // raw 10 + override 7 + outbound 3
        assert_eq!(breakdown.hub.base_cost, 20.0);
        assert_eq!(breakdown.hub.freight_source, FreightSource::Override);
    }

    #[test]
    fn test_direct_rate_table_beats_itemized_and_override() {
        let mut product = sample_product();
        product.package_size = 2.0;
        product.express_freight = 4.0;
        product.customs_fee = 1.0;
        let breakdown = compute_costs(&product, &sample_params());

        assert_eq!(breakdown.direct.freight, 13.51);
        assert_eq!(breakdown.direct.freight_source, FreightSource::RateTable);
    }

    #[test]
    fn test_direct_itemized_beats_override_without_table_match() {
        let mut product = sample_product();
        product.package_size = 0.0;
        product.express_freight = 4.0;
        product.customs_fee = 1.0;
        let breakdown = compute_costs(&product, &sample_params());

        assert_eq!(breakdown.direct.freight, 5.0);
        assert_eq!(breakdown.direct.freight_source, FreightSource::Itemized);
    }

    #[test]
    fn test_tie_favors_hub_route() {
        // identical freight on both routes -> identical landed costs
        let product = ProductRecord {
            title: "Tie".to_string(),
            sale_price: 10.0,
            raw_cost: 5.0,
            hub_freight_override: 8.0,
            direct_freight_override: 8.0,
            ..Default::default()
        };
        let breakdown = compute_costs(&product, &sample_params());
        assert_eq!(breakdown.hub.landed, breakdown.direct.landed);
        assert_eq!(breakdown.optimal_route, Route::Hub);
        assert_eq!(breakdown.cost_difference, 0.0);
    }

    #[test]
    fn test_all_fields_zero_degrades_silently() {
        // garbage-in, silently-zeroed: an empty record still computes
        let breakdown = compute_costs(&ProductRecord::default(), &sample_params());
        assert_eq!(breakdown.hub.landed, 5.0); // ad cost only
        assert_eq!(breakdown.hub.freight_source, FreightSource::Unresolved);
        assert_eq!(breakdown.direct.freight_source, FreightSource::Unresolved);
    }

    #[test]
    fn test_secondary_currency_cost() {
        let mut product = sample_product();
        product.raw_cost = 0.0;
        product.raw_cost_usd = 20.0;
        let mut params = sample_params();
        params.usd_eur_rate = Some(0.9);
        let breakdown = compute_costs(&product, &params);

        // 20 USD * 0.9 + legs 3 + outbound 3
        assert_eq!(breakdown.hub.base_cost, 24.0);
    }
}

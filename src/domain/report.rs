//! Catalog-level aggregation over computed breakdowns: profitability counts,
//! per-route savings, top and bottom performers.

use serde::Serialize;

use crate::domain::model::{CostBreakdown, ProductRecord, Route};

/// Aggregate figures for one computation pass over a catalog.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogSummary {
    pub total_products: usize,
    pub profitable: usize,
    pub losing: usize,
    /// Mean margin % over products with a set sale price.
    pub average_margin_pct: f64,
    /// Products for which the hub route won, and the landed-cost savings it
    /// delivered over the direct route.
    pub hub_route_count: usize,
    pub hub_route_savings: f64,
    pub direct_route_count: usize,
    pub direct_route_savings: f64,
}

pub fn summarize(rows: &[(ProductRecord, CostBreakdown)]) -> CatalogSummary {
    let mut summary = CatalogSummary {
        total_products: rows.len(),
        ..Default::default()
    };

    let mut pct_sum = 0.0;
    let mut pct_count = 0usize;

    for (record, breakdown) in rows {
        let margin = breakdown.margin(record.sale_price);
        if margin > 0.0 {
            summary.profitable += 1;
        } else if margin < 0.0 {
            summary.losing += 1;
        }
        if let Some(pct) = breakdown.margin_pct(record.sale_price) {
            pct_sum += pct;
            pct_count += 1;
        }
        match breakdown.optimal_route {
            Route::Hub => {
                summary.hub_route_count += 1;
                summary.hub_route_savings += breakdown.cost_difference;
            }
            Route::Direct => {
                summary.direct_route_count += 1;
                summary.direct_route_savings += breakdown.cost_difference;
            }
        }
    }

    if pct_count > 0 {
        summary.average_margin_pct = pct_sum / pct_count as f64;
    }
    summary
}

/// Row indices ordered by absolute margin, best first.
pub fn rank_by_margin(rows: &[(ProductRecord, CostBreakdown)]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    indices.sort_by(|&a, &b| {
        let margin_a = rows[a].1.margin(rows[a].0.sale_price);
        let margin_b = rows[b].1.margin(rows[b].0.sale_price);
        margin_b
            .partial_cmp(&margin_a)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engine::compute_costs;
    use crate::domain::model::{ParameterSet, ProductRecord};

    fn row(title: &str, sale_price: f64, raw_cost: f64) -> (ProductRecord, CostBreakdown) {
        let record = ProductRecord {
            title: title.to_string(),
            sale_price,
            raw_cost,
            hub_freight_override: 2.0,
            direct_freight_override: 30.0,
            ..Default::default()
        };
        let params = ParameterSet {
            ad_cost_per_unit: 1.0,
            marketplace_fee_pct: 10.0,
            tax_pct: 0.0,
            usd_eur_rate: None,
        };
        let breakdown = compute_costs(&record, &params);
        (record, breakdown)
    }

    #[test]
    fn test_summarize_counts_and_savings() {
        // landed(hub) = raw + 2 + 1 + 10% of sale
        let rows = vec![
            row("winner", 50.0, 10.0),  // landed 18, margin 32
            row("loser", 10.0, 20.0),   // landed 24, margin -14
            row("unpriced", 0.0, 10.0), // margin negative, pct skipped
        ];
        let summary = summarize(&rows);

        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.profitable, 1);
        assert_eq!(summary.losing, 2);
        assert_eq!(summary.hub_route_count, 3);
        assert_eq!(summary.direct_route_count, 0);
        assert!(summary.hub_route_savings > 0.0);

        // only the two priced products contribute to the average
        let expected = ((50.0 - 18.0) / 50.0 * 100.0 + (10.0 - 24.0) / 10.0 * 100.0) / 2.0;
        assert!((summary.average_margin_pct - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rank_by_margin() {
        let rows = vec![
            row("middle", 30.0, 10.0),
            row("best", 50.0, 10.0),
            row("worst", 10.0, 20.0),
        ];
        let ranked = rank_by_margin(&rows);
        assert_eq!(ranked, vec![1, 0, 2]);
    }
}

use super::calendar::MonthKey;
use super::channels::allocate;
use super::growth::growth_factors;
use super::metric::{Metric, round_count, safe_div};
use super::quarterly::{BaseMetrics, apply_quarterly_overrides};
use super::supplier;
use super::types::{
    CostInputs, MarketplaceInputs, MarketplaceMonth, MarketplaceSummary, ModelKind, ModelMonth,
    ModelRun,
};

pub type MarketplaceRun = ModelRun<MarketplaceMonth, MarketplaceSummary>;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MarketplaceState {
    pub active_suppliers: u64,
}

impl MarketplaceState {
    pub fn initial(inputs: &MarketplaceInputs) -> Self {
        Self {
            active_suppliers: inputs.suppliers.as_ref().map_or(0, |s| s.active_suppliers),
        }
    }
}

fn base_metrics(inputs: &MarketplaceInputs, costs: &CostInputs) -> BaseMetrics {
    BaseMetrics {
        conversion_rate: inputs.visitor_to_buyer_rate,
        price: inputs.average_order_value,
        visitors: inputs.monthly_visitors,
        refund_rate: inputs.refund_rate,
        take_rate: inputs.take_rate,
        ..BaseMetrics::from_costs(costs)
    }
}

/// Buyers of the un-adjusted inputs, the denominator of the single-month CAC.
pub fn base_buyers(inputs: &MarketplaceInputs) -> u64 {
    round_count(inputs.monthly_visitors * inputs.visitor_to_buyer_rate)
}

pub fn step_month(
    inputs: &MarketplaceInputs,
    costs: &CostInputs,
    key: MonthKey,
    month_index: u32,
    base_year: i32,
    state: MarketplaceState,
) -> (ModelMonth<MarketplaceMonth>, MarketplaceState) {
    let adj = &inputs.adjustments;
    let base = apply_quarterly_overrides(
        month_index,
        base_year,
        &adj.quarterly_detailed_settings,
        ModelKind::Marketplace,
        base_metrics(inputs, costs),
    );
    let factors = growth_factors(month_index, base_year, &adj.growth_rate_settings);
    let acquisition = allocate(base.visitors, &inputs.channels);

    let buyers = round_count(base.visitors * base.conversion_rate);
    let orders =
        round_count(buyers as f64 * inputs.orders_per_buyer_per_month * factors.orders);

    let (supply, next) = match &inputs.suppliers {
        Some(info) => (
            Some(supplier::step(state.active_suppliers, info)),
            MarketplaceState {
                active_suppliers: supplier::advance(state.active_suppliers, info),
            },
        ),
        None => (None, state),
    };
    let supplier_revenue = supply.map_or(0.0, |s| s.total_revenue);

    let gmv = (orders as f64 * base.price + supplier_revenue) * factors.revenue;
    let refunds = gmv * base.refund_rate;
    let net_gmv = gmv - refunds;
    let platform_revenue = net_gmv * base.take_rate
        + orders as f64 * inputs.fixed_fee_per_order
        + inputs.ad_revenue_per_month;
    let total_costs =
        base.fixed_costs() + acquisition.total_cost + costs.payment_fee_rate * platform_revenue;

    let month = ModelMonth {
        key,
        revenue: platform_revenue,
        customers: buyers,
        total_costs,
        detail: MarketplaceMonth {
            visitors: round_count(base.visitors),
            buyers,
            orders,
            gmv,
            refunds,
            net_gmv,
            platform_revenue,
            take_rate: base.take_rate,
            active_suppliers: if supply.is_some() { state.active_suppliers } else { 0 },
            supplier_revenue,
            supplier_listings: supply.map_or(0.0, |s| s.total_listings),
            estimated_supplier_orders: supply.map_or(0, |s| s.estimated_orders),
            acquisition_spend: acquisition.total_cost,
        },
    };
    (month, next)
}

pub fn simulate(
    inputs: &MarketplaceInputs,
    costs: &CostInputs,
    start: MonthKey,
    months: u32,
) -> MarketplaceRun {
    let base_year = start.year();
    let mut state = MarketplaceState::initial(inputs);
    let mut records = Vec::with_capacity(months as usize);
    for (index, key) in start.range(months).enumerate() {
        let (month, next) = step_month(inputs, costs, key, index as u32, base_year, state);
        state = next;
        records.push(month);
    }

    let summary = MarketplaceSummary {
        total_orders: records.iter().map(|m| m.detail.orders).sum(),
        total_gmv: records.iter().map(|m| m.detail.gmv).sum(),
        total_platform_revenue: records.iter().map(|m| m.detail.platform_revenue).sum(),
        total_refunds: records.iter().map(|m| m.detail.refunds).sum(),
        average_take_rate: safe_div(
            records.iter().map(|m| m.detail.take_rate).sum(),
            records.len() as f64,
        ),
        final_active_suppliers: records.last().map_or(0, |m| m.detail.active_suppliers),
        ltv: Metric::ratio(
            inputs.average_order_value * inputs.orders_per_buyer_per_month * inputs.take_rate,
            inputs.refund_rate,
        ),
        cac: safe_div(costs.marketing_cost, base_buyers(inputs) as f64),
    };
    ModelRun {
        total_customers: records.iter().map(|m| m.detail.buyers).sum(),
        months: records,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures;
    use crate::core::supplier::ASSUMED_SUPPLIER_ORDER_VALUE;
    use crate::core::types::{
        ChannelInfo, ConversionOverrides, CostOverrides, GrowthTargets, MetricOverrides,
        PricingOverrides, QuarterlyDetailedSettings, QuarterlyGrowthRate, QuarterlyMetrics,
        SupplierInfo,
    };
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn start() -> MonthKey {
        MonthKey::new(2025, 1).expect("valid month")
    }

    #[test]
    fn first_month_matches_reference_scenario() {
        let run = simulate(&fixtures::marketplace(), &fixtures::costs(), start(), 1);
        let d = &run.months[0].detail;
        assert_eq!(d.buyers, 1_000);
        assert_eq!(d.orders, 2_000);
        assert_approx(d.gmv, 60_000_000.0);
        assert_approx(d.net_gmv, 57_000_000.0);
        assert_approx(d.platform_revenue, 8_200_000.0);
        assert_approx(run.months[0].revenue, 8_200_000.0);
        assert_eq!(d.active_suppliers, 0);
        assert_eq!(d.estimated_supplier_orders, 0);
    }

    #[test]
    fn summary_totals_and_kpis() {
        let run = simulate(&fixtures::marketplace(), &fixtures::costs(), start(), 3);
        assert_eq!(run.summary.total_orders, 6_000);
        assert_approx(run.summary.total_gmv, 180_000_000.0);
        assert_approx(run.summary.total_refunds, 9_000_000.0);
        assert_approx(run.summary.total_platform_revenue, 24_600_000.0);
        assert_approx(run.summary.average_take_rate, 0.10);
        assert_eq!(run.total_customers, 3_000);
        assert_approx(run.summary.ltv.finite().unwrap_or(f64::NAN), 30_000.0 * 2.0 * 0.1 / 0.05);
        assert_approx(run.summary.cac, 2_000.0);
    }

    #[test]
    fn zero_refund_and_zero_buyers_resolve_to_sentinels() {
        let mut inputs = fixtures::marketplace();
        inputs.refund_rate = 0.0;
        inputs.visitor_to_buyer_rate = 0.0;
        let run = simulate(&inputs, &fixtures::costs(), start(), 2);
        assert!(run.summary.ltv.is_unbounded());
        assert_eq!(run.summary.cac, 0.0);
        assert_approx(run.months[0].revenue, 500_000.0);
    }

    #[test]
    fn suppliers_add_revenue_and_grow_linearly() {
        let mut inputs = fixtures::marketplace();
        inputs.suppliers = Some(SupplierInfo {
            new_suppliers_per_month: 2,
            active_suppliers: 10,
            average_listings_per_supplier: 4.0,
            average_revenue_per_supplier: 300_000.0,
        });
        let run = simulate(&inputs, &fixtures::costs(), start(), 3);
        let active: Vec<u64> = run.months.iter().map(|m| m.detail.active_suppliers).collect();
        assert_eq!(active, vec![10, 12, 14]);
        let first = &run.months[0].detail;
        assert_approx(first.supplier_revenue, 3_000_000.0);
        assert_approx(first.supplier_listings, 40.0);
        assert_eq!(
            first.estimated_supplier_orders,
            (3_000_000.0 / ASSUMED_SUPPLIER_ORDER_VALUE).round() as u64
        );
        assert_approx(first.gmv, 63_000_000.0);
        assert_eq!(run.summary.final_active_suppliers, 14);
    }

    #[test]
    fn orders_axis_growth_is_independent() {
        let mut inputs = fixtures::marketplace();
        inputs.adjustments.growth_rate_settings.quarterly_rates = vec![QuarterlyGrowthRate {
            quarter: 1,
            year: 2025,
            growth_rate: 0.5,
            applies_to: GrowthTargets { revenue: false, customers: false, orders: true },
            description: None,
        }];
        let run = simulate(&inputs, &fixtures::costs(), start(), 1);
        assert_eq!(run.months[0].detail.buyers, 1_000);
        assert_eq!(run.months[0].detail.orders, 3_000);
        assert_approx(run.months[0].detail.gmv, 90_000_000.0);
    }

    #[test]
    fn default_growth_scales_orders_and_revenue_not_buyers() {
        let mut inputs = fixtures::marketplace();
        inputs.adjustments.growth_rate_settings.quarterly_rates = vec![QuarterlyGrowthRate {
            quarter: 1,
            year: 2025,
            growth_rate: 0.1,
            applies_to: GrowthTargets::default(),
            description: None,
        }];
        let run = simulate(&inputs, &fixtures::costs(), start(), 4);
        let first = &run.months[0].detail;
        assert_eq!(first.buyers, 1_000);
        assert_eq!(first.orders, 2_200);
        assert_eq!(run.months[0].customers, 1_000);
        assert_approx(first.gmv, 2_200.0 * 30_000.0 * 1.1);
        // second run-quarter is unscheduled
        assert_eq!(run.months[3].detail.orders, 2_000);
        assert_approx(run.months[3].detail.gmv, 60_000_000.0);
    }

    fn second_quarter_metrics(metrics: MetricOverrides) -> QuarterlyDetailedSettings {
        QuarterlyDetailedSettings {
            use_detailed_settings: true,
            quarterly_metrics: vec![QuarterlyMetrics {
                quarter: 2,
                year: 2025,
                conversion_rates: ConversionOverrides::default(),
                pricing: PricingOverrides::default(),
                costs: CostOverrides::default(),
                metrics,
                description: None,
            }],
        }
    }

    #[test]
    fn refund_override_changes_refunds_in_its_quarter_only() {
        let mut inputs = fixtures::marketplace();
        inputs.adjustments.quarterly_detailed_settings = second_quarter_metrics(MetricOverrides {
            refund_rate: Some(0.2),
            ..MetricOverrides::default()
        });
        let run = simulate(&inputs, &fixtures::costs(), start(), 6);
        let before = &run.months[2].detail;
        assert_approx(before.refunds, 3_000_000.0);
        let during = &run.months[3].detail;
        assert_approx(during.gmv, 60_000_000.0);
        assert_approx(during.refunds, 12_000_000.0);
        assert_approx(during.net_gmv, 48_000_000.0);
        // 48M * 0.1 + 2000 * 1000 + 500k
        assert_approx(during.platform_revenue, 7_300_000.0);
        assert_approx(run.summary.total_refunds, 3.0 * 3_000_000.0 + 3.0 * 12_000_000.0);
    }

    #[test]
    fn take_rate_override_changes_platform_revenue_and_average() {
        let mut inputs = fixtures::marketplace();
        inputs.adjustments.quarterly_detailed_settings = second_quarter_metrics(MetricOverrides {
            take_rate: Some(0.2),
            ..MetricOverrides::default()
        });
        let run = simulate(&inputs, &fixtures::costs(), start(), 6);
        assert_approx(run.months[0].detail.platform_revenue, 8_200_000.0);
        assert_eq!(run.months[0].detail.take_rate, 0.1);
        let during = &run.months[4].detail;
        assert_eq!(during.take_rate, 0.2);
        // 57M * 0.2 + 2000 * 1000 + 500k
        assert_approx(during.platform_revenue, 13_900_000.0);
        assert_approx(run.summary.average_take_rate, 0.15);
        assert_approx(
            run.summary.total_platform_revenue,
            3.0 * 8_200_000.0 + 3.0 * 13_900_000.0,
        );
    }

    #[test]
    fn channel_spend_is_added_to_costs() {
        let mut inputs = fixtures::marketplace();
        inputs.channels = vec![ChannelInfo {
            name: "ads".to_string(),
            percentage: 0.5,
            cost_per_visitor: Some(10.0),
        }];
        let run = simulate(&inputs, &fixtures::costs(), start(), 1);
        assert_approx(run.months[0].detail.acquisition_spend, 250_000.0);
        assert_approx(
            run.months[0].total_costs,
            8_000_000.0 + 250_000.0 + 0.03 * 8_200_000.0,
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_refunds_and_net_gmv_reconcile(
            visitors in 0u32..500_000,
            buyer_bp in 0u32..1_000,
            refund_bp in 0u32..10_000,
            suppliers in 0u64..50,
            months in 1u32..18
        ) {
            let mut inputs = fixtures::marketplace();
            inputs.monthly_visitors = visitors as f64;
            inputs.visitor_to_buyer_rate = buyer_bp as f64 / 10_000.0;
            inputs.refund_rate = refund_bp as f64 / 10_000.0;
            inputs.suppliers = Some(SupplierInfo {
                new_suppliers_per_month: 1,
                active_suppliers: suppliers,
                average_listings_per_supplier: 3.0,
                average_revenue_per_supplier: 100_000.0,
            });
            let run = simulate(&inputs, &fixtures::costs(), start(), months);
            prop_assert_eq!(run.months.len() as u32, months);
            for (i, month) in run.months.iter().enumerate() {
                let d = &month.detail;
                prop_assert!((d.net_gmv - (d.gmv - d.refunds)).abs() <= 1e-6 * (1.0 + d.gmv));
                prop_assert_eq!(d.active_suppliers, suppliers + i as u64);
            }
        }
    }
}

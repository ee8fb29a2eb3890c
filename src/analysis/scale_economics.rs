use serde::Serialize;

use super::revenue_buckets;
use crate::core::{BusinessType, MonthlyResult, MonthlySeries, round_count};

const PROJECTION_FACTORS: [f64; 4] = [0.5, 1.0, 2.0, 3.0];
const PROJECTION_FLOOR: f64 = 0.5;
const PROJECTION_DECAY: f64 = 0.9;
const NETWORK_EFFECT: f64 = 1.2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Efficiency {
    High,
    Medium,
    Low,
}

impl Efficiency {
    pub fn for_cost_ratio(cost_ratio: f64) -> Self {
        if cost_ratio < 0.6 {
            Efficiency::High
        } else if cost_ratio < 0.8 {
            Efficiency::Medium
        } else {
            Efficiency::Low
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueScale {
    pub min_revenue: f64,
    pub max_revenue: f64,
    pub average_revenue: f64,
    pub average_costs: f64,
    pub cost_ratio: f64,
    pub efficiency: Efficiency,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedEfficiency {
    pub revenue_growth: f64,
    pub cost_ratio: f64,
    pub savings: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingScale {
    pub min_revenue: f64,
    pub max_revenue: f64,
    pub cost_ratio: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum BusinessScaleMetrics {
    #[serde(rename_all = "camelCase")]
    Subscription {
        optimal_customer_count: u64,
        customer_acquisition_efficiency: f64,
    },
    #[serde(rename_all = "camelCase")]
    UnitEconomics {
        optimal_production_volume: u64,
        production_efficiency: f64,
    },
    #[serde(rename_all = "camelCase")]
    Marketplace {
        optimal_transaction_volume: u64,
        network_efficiency_factor: f64,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleEconomicsAnalysis {
    pub revenue_scales: Vec<RevenueScale>,
    pub projected_efficiency: Vec<ProjectedEfficiency>,
    /// 0..=1; how much the cost ratio falls from the lowest to the highest revenue group.
    pub scale_economics_index: f64,
    pub optimal_operating_scale: OperatingScale,
    pub business_metrics: Option<BusinessScaleMetrics>,
}

fn average_within<F>(months: &[&MonthlyResult], scale: &OperatingScale, value: F) -> u64
where
    F: Fn(&MonthlyResult) -> f64,
{
    let inside: Vec<f64> = months
        .iter()
        .filter(|m| m.revenue >= scale.min_revenue && m.revenue <= scale.max_revenue)
        .map(|m| value(m))
        .collect();
    if inside.is_empty() {
        0
    } else {
        round_count(inside.iter().sum::<f64>() / inside.len() as f64)
    }
}

pub fn analyze_scale_economics(
    monthly: &MonthlySeries,
    business_type: BusinessType,
) -> ScaleEconomicsAnalysis {
    let buckets = revenue_buckets(monthly);
    let revenue_scales: Vec<RevenueScale> = buckets
        .iter()
        .map(|bucket| {
            let average_revenue = bucket.average_revenue();
            let average_costs = bucket.average_costs();
            let cost_ratio = if average_revenue > 0.0 {
                average_costs / average_revenue
            } else {
                1.0
            };
            RevenueScale {
                min_revenue: bucket.min_revenue(),
                max_revenue: bucket.max_revenue(),
                average_revenue,
                average_costs,
                cost_ratio,
                efficiency: Efficiency::for_cost_ratio(cost_ratio),
            }
        })
        .collect();
    let (Some(first), Some(last)) = (revenue_scales.first(), revenue_scales.last()) else {
        return ScaleEconomicsAnalysis::default();
    };

    let scale_economics_index = if buckets.len() >= 2 && first.cost_ratio > 0.0 {
        ((first.cost_ratio - last.cost_ratio) / first.cost_ratio).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let last_month_revenue = monthly.values().next_back().map_or(0.0, |m| m.revenue);
    let projected_efficiency = PROJECTION_FACTORS
        .iter()
        .map(|&factor| {
            let revenue_growth = last_month_revenue * factor;
            let cost_ratio = (first.cost_ratio * PROJECTION_DECAY.powf((1.0 + factor).log2()))
                .max(PROJECTION_FLOOR);
            ProjectedEfficiency {
                revenue_growth,
                cost_ratio,
                savings: revenue_growth * (first.cost_ratio - cost_ratio),
            }
        })
        .collect();

    // Lowest cost ratio; the lower revenue group wins ties.
    let optimal = revenue_scales
        .iter()
        .reduce(|best, s| if s.cost_ratio < best.cost_ratio { s } else { best })
        .map(|s| OperatingScale {
            min_revenue: s.min_revenue,
            max_revenue: s.max_revenue,
            cost_ratio: s.cost_ratio,
        })
        .unwrap_or_default();

    let sorted = buckets.sorted();
    let business_metrics = match business_type {
        BusinessType::Subscription => Some(BusinessScaleMetrics::Subscription {
            optimal_customer_count: average_within(sorted, &optimal, |m| m.customers as f64),
            customer_acquisition_efficiency: scale_economics_index,
        }),
        BusinessType::UnitEconomics => Some(BusinessScaleMetrics::UnitEconomics {
            optimal_production_volume: average_within(sorted, &optimal, |m| {
                m.production().unwrap_or(0) as f64
            }),
            production_efficiency: scale_economics_index,
        }),
        BusinessType::Marketplace => Some(BusinessScaleMetrics::Marketplace {
            optimal_transaction_volume: average_within(sorted, &optimal, |m| {
                m.orders().unwrap_or(0) as f64
            }),
            network_efficiency_factor: scale_economics_index * NETWORK_EFFECT,
        }),
        BusinessType::Hybrid => None,
    };

    ScaleEconomicsAnalysis {
        revenue_scales,
        projected_efficiency,
        scale_economics_index,
        optimal_operating_scale: optimal,
        business_metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{fixtures, run_simulation};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn analysis_for(business_type: BusinessType, months: u32) -> ScaleEconomicsAnalysis {
        let result =
            run_simulation(&fixtures::request(business_type, months)).expect("valid request");
        analyze_scale_economics(&result.monthly, business_type)
    }

    #[test]
    fn grades_cost_ratios() {
        assert_eq!(Efficiency::for_cost_ratio(0.59), Efficiency::High);
        assert_eq!(Efficiency::for_cost_ratio(0.6), Efficiency::Medium);
        assert_eq!(Efficiency::for_cost_ratio(0.79), Efficiency::Medium);
        assert_eq!(Efficiency::for_cost_ratio(0.8), Efficiency::Low);
    }

    #[test]
    fn growing_subscription_shows_economies_of_scale() {
        let analysis = analysis_for(BusinessType::Subscription, 12);
        assert_eq!(analysis.revenue_scales.len(), 4);
        let first = analysis.revenue_scales[0].cost_ratio;
        let last = analysis.revenue_scales[3].cost_ratio;
        assert!(first > last);
        assert_approx(analysis.scale_economics_index, (first - last) / first);
        assert_approx(analysis.optimal_operating_scale.cost_ratio, last);
        match analysis.business_metrics {
            Some(BusinessScaleMetrics::Subscription {
                optimal_customer_count,
                customer_acquisition_efficiency,
            }) => {
                assert!(optimal_customer_count > 0);
                assert_approx(customer_acquisition_efficiency, analysis.scale_economics_index);
            }
            other => panic!("unexpected metrics {other:?}"),
        }
    }

    #[test]
    fn projections_follow_log_decay_with_floor() {
        let analysis = analysis_for(BusinessType::Subscription, 12);
        let first = analysis.revenue_scales[0].cost_ratio;
        assert_eq!(analysis.projected_efficiency.len(), 4);
        let one = &analysis.projected_efficiency[1];
        let expected = (first * 0.9).max(0.5);
        assert_approx(one.cost_ratio, expected);
        assert_approx(one.savings, one.revenue_growth * (first - expected));
        for projection in &analysis.projected_efficiency {
            assert!(projection.cost_ratio >= 0.5);
        }
    }

    #[test]
    fn flat_unit_economics_has_no_scale_effect() {
        let analysis = analysis_for(BusinessType::UnitEconomics, 8);
        assert_approx(analysis.scale_economics_index, 0.0);
        assert!(
            analysis
                .revenue_scales
                .iter()
                .all(|s| s.efficiency == Efficiency::Low)
        );
        assert_eq!(
            analysis.business_metrics,
            Some(BusinessScaleMetrics::UnitEconomics {
                optimal_production_volume: 1_500,
                production_efficiency: 0.0,
            })
        );
    }

    #[test]
    fn marketplace_network_factor_scales_index() {
        let analysis = analysis_for(BusinessType::Marketplace, 12);
        match analysis.business_metrics {
            Some(BusinessScaleMetrics::Marketplace {
                network_efficiency_factor,
                ..
            }) => assert_approx(network_efficiency_factor, analysis.scale_economics_index * 1.2),
            other => panic!("unexpected metrics {other:?}"),
        }
    }

    #[test]
    fn hybrid_and_empty_runs() {
        assert!(analysis_for(BusinessType::Hybrid, 12).business_metrics.is_none());
        let empty = analyze_scale_economics(&MonthlySeries::new(), BusinessType::Subscription);
        assert_eq!(empty, ScaleEconomicsAnalysis::default());
    }

    #[test]
    fn single_month_has_zero_index() {
        let analysis = analysis_for(BusinessType::Subscription, 1);
        assert_eq!(analysis.revenue_scales.len(), 1);
        assert_approx(analysis.scale_economics_index, 0.0);
    }
}

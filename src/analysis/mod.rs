//! Derived analyses over a finished simulation run.
//!
//! Every analyzer is a pure function of the run (and, where needed, the
//! request that produced it). [`analyze`] bundles them into one report for the
//! HTTP and CLI adapters.

mod benchmarks;
mod break_even;
mod cost_structure;
mod hr_cost;
mod scale_economics;

use serde::{Deserialize, Serialize};

use crate::core::{
    Adjustments, BusinessType, FunnelEfficiency, GrowthRateSummary, MonthKey, MonthlyResult,
    MonthlySeries, QuarterlyCoverage, SimulationError, SimulationRequest, SimulationResult,
    analyze_funnel_efficiency, analyze_quarterly_coverage, growth_rate_summary,
};

pub use benchmarks::{
    BenchmarkComparison, BenchmarkReport, BenchmarkStatus, ConversionBenchmarks, IndustryBenchmark,
    Stage, all_benchmarks, compare_with_benchmarks, industry_benchmark,
};
pub use break_even::{
    BreakEvenAnalysis, DEFAULT_FIXED_COST_SHARE, DEFAULT_VARIABLE_COST_RATIO, analyze_break_even,
    analyze_break_even_from_summary,
};
pub use cost_structure::{
    CostStructureAnalysis, DEFAULT_FIXED_MARKETING_RATIO, FixedCostBreakdown,
    ScaleEfficiencyPoint, VariableCostBreakdown, analyze_cost_structure, implied_margin,
};
pub use hr_cost::{Department, DepartmentCost, HrCostAnalysis, analyze_hr_costs, default_departments};
pub use scale_economics::{
    BusinessScaleMetrics, Efficiency, OperatingScale, ProjectedEfficiency, RevenueScale,
    ScaleEconomicsAnalysis, analyze_scale_economics,
};

/// Months sorted by revenue and cut into at most four contiguous groups.
pub(crate) struct RevenueBucket<'a> {
    months: &'a [&'a MonthlyResult],
}

impl RevenueBucket<'_> {
    pub(crate) fn min_revenue(&self) -> f64 {
        self.months.first().map_or(0.0, |m| m.revenue)
    }

    pub(crate) fn max_revenue(&self) -> f64 {
        self.months.last().map_or(0.0, |m| m.revenue)
    }

    pub(crate) fn average_revenue(&self) -> f64 {
        self.months.iter().map(|m| m.revenue).sum::<f64>() / self.months.len() as f64
    }

    pub(crate) fn average_costs(&self) -> f64 {
        self.months.iter().map(|m| m.total_costs).sum::<f64>() / self.months.len() as f64
    }
}

pub(crate) struct RevenueBuckets<'a> {
    sorted: Vec<&'a MonthlyResult>,
    bounds: Vec<(usize, usize)>,
}

impl<'a> RevenueBuckets<'a> {
    pub(crate) fn iter(&self) -> impl Iterator<Item = RevenueBucket<'_>> {
        self.bounds.iter().map(|&(start, end)| RevenueBucket {
            months: &self.sorted[start..=end],
        })
    }

    /// Months in ascending revenue order.
    pub(crate) fn sorted(&self) -> &[&'a MonthlyResult] {
        &self.sorted
    }

    pub(crate) fn len(&self) -> usize {
        self.bounds.len()
    }
}

/// Quartile split: `step = max(1, n / 4)`, the fourth group runs to the end.
pub(crate) fn revenue_buckets(monthly: &MonthlySeries) -> RevenueBuckets<'_> {
    let mut sorted: Vec<&MonthlyResult> = monthly.values().collect();
    sorted.sort_by(|a, b| a.revenue.total_cmp(&b.revenue));
    let n = sorted.len();
    let mut bounds = Vec::with_capacity(4);
    if n > 0 {
        let step = (n / 4).max(1);
        for i in 0..4 {
            let start = i * step;
            let end = if i == 3 { n - 1 } else { ((i + 1) * step - 1).min(n - 1) };
            if start < n && start <= end {
                bounds.push((start, end));
            }
        }
    }
    RevenueBuckets { sorted, bounds }
}

/// Tunables for [`analyze`]; every field is optional on the wire.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisOptions {
    pub fixed_costs: Option<f64>,
    pub variable_cost_ratio: Option<f64>,
    pub fixed_marketing_ratio: f64,
    pub fixed_cost_share: f64,
    pub departments: Option<Vec<Department>>,
    pub stage: Stage,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            fixed_costs: None,
            variable_cost_ratio: None,
            fixed_marketing_ratio: DEFAULT_FIXED_MARKETING_RATIO,
            fixed_cost_share: DEFAULT_FIXED_COST_SHARE,
            departments: None,
            stage: Stage::Startup,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub break_even: BreakEvenAnalysis,
    pub break_even_from_summary: BreakEvenAnalysis,
    pub cost_structure: CostStructureAnalysis,
    pub scale_economics: ScaleEconomicsAnalysis,
    pub hr_costs: HrCostAnalysis,
    pub benchmarks: BenchmarkReport,
    pub growth_rates: Option<GrowthRateSummary>,
    pub quarterly_coverage: Option<QuarterlyCoverage>,
    pub funnel_efficiency: Option<FunnelEfficiency>,
}

/// Adjustments of the model that drives the run; hybrid reads its subscription side.
fn primary_adjustments(request: &SimulationRequest) -> Option<&Adjustments> {
    match request.business_type {
        BusinessType::Subscription | BusinessType::Hybrid => {
            request.subscription.as_ref().map(|s| &s.adjustments)
        }
        BusinessType::UnitEconomics => request.unit_economics.as_ref().map(|u| &u.adjustments),
        BusinessType::Marketplace => request.marketplace.as_ref().map(|m| &m.adjustments),
    }
}

/// Runs every analyzer over `result`, which must come from `request`.
pub fn analyze(
    request: &SimulationRequest,
    result: &SimulationResult,
    options: &AnalysisOptions,
) -> Result<AnalysisReport, SimulationError> {
    let start: MonthKey = request.start_month.parse()?;
    let months = result.monthly.len() as u32;
    let adjustments = primary_adjustments(request);

    let growth_rates = adjustments
        .filter(|adj| !adj.growth_rate_settings.quarterly_rates.is_empty())
        .map(|adj| growth_rate_summary(&adj.growth_rate_settings));
    let quarterly_coverage = adjustments
        .filter(|adj| adj.quarterly_detailed_settings.use_detailed_settings)
        .map(|adj| analyze_quarterly_coverage(&adj.quarterly_detailed_settings, months, start.year()));
    let funnel_efficiency = adjustments
        .filter(|adj| !adj.custom_funnels.is_empty())
        .map(|adj| analyze_funnel_efficiency(&adj.custom_funnels, adj.active_funnel_id.as_deref()));

    Ok(AnalysisReport {
        break_even: analyze_break_even(
            &result.monthly,
            options.fixed_costs,
            options.variable_cost_ratio,
        ),
        break_even_from_summary: analyze_break_even_from_summary(
            &result.summary,
            months,
            options.fixed_cost_share,
        ),
        cost_structure: analyze_cost_structure(
            &result.monthly,
            &request.cost_inputs,
            options.fixed_marketing_ratio,
        ),
        scale_economics: analyze_scale_economics(&result.monthly, request.business_type),
        hr_costs: analyze_hr_costs(&result.monthly, options.departments.as_deref()),
        benchmarks: compare_with_benchmarks(request, result, options.stage),
        growth_rates,
        quarterly_coverage,
        funnel_efficiency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        CustomFunnel, FunnelStep, QuarterlyGrowthRate, fixtures, run_simulation,
    };

    fn bucket_sizes(months: u32) -> Vec<usize> {
        let result = run_simulation(&fixtures::request(BusinessType::Subscription, months))
            .expect("valid request");
        revenue_buckets(&result.monthly)
            .iter()
            .map(|bucket| bucket.months.len())
            .collect()
    }

    #[test]
    fn buckets_cover_every_month_once() {
        assert_eq!(bucket_sizes(12), vec![3, 3, 3, 3]);
        assert_eq!(bucket_sizes(7), vec![1, 1, 1, 4]);
        assert_eq!(bucket_sizes(3), vec![1, 1, 1]);
        assert_eq!(bucket_sizes(1), vec![1]);
        assert!(revenue_buckets(&MonthlySeries::new()).iter().next().is_none());
    }

    #[test]
    fn buckets_are_ordered_by_revenue() {
        let result = run_simulation(&fixtures::request(BusinessType::Marketplace, 12))
            .expect("valid request");
        let buckets = revenue_buckets(&result.monthly);
        let ranges: Vec<(f64, f64)> = buckets
            .iter()
            .map(|b| (b.min_revenue(), b.max_revenue()))
            .collect();
        for pair in ranges.windows(2) {
            assert!(pair[0].1 <= pair[1].0);
        }
    }

    #[test]
    fn report_includes_adjustment_diagnostics_only_when_configured() {
        let request = fixtures::request(BusinessType::Subscription, 12);
        let result = run_simulation(&request).expect("valid request");
        let report = analyze(&request, &result, &AnalysisOptions::default()).expect("valid");
        assert!(report.growth_rates.is_none());
        assert!(report.quarterly_coverage.is_none());
        assert!(report.funnel_efficiency.is_none());
        assert_eq!(report.hr_costs.total_headcount, 7);

        let mut request = fixtures::request(BusinessType::Subscription, 12);
        if let Some(sub) = request.subscription.as_mut() {
            sub.adjustments.growth_rate_settings.quarterly_rates.push(QuarterlyGrowthRate {
                quarter: 2,
                year: 2025,
                growth_rate: 0.1,
                applies_to: Default::default(),
                description: None,
            });
            sub.adjustments.custom_funnels.push(CustomFunnel {
                id: "f1".to_string(),
                name: "Trial".to_string(),
                steps: vec![
                    FunnelStep {
                        id: None,
                        name: "visit".to_string(),
                        order: 1,
                        conversion_rate: 0.5,
                    },
                    FunnelStep {
                        id: None,
                        name: "trial".to_string(),
                        order: 2,
                        conversion_rate: 0.2,
                    },
                ],
                is_active: true,
            });
        }
        let result = run_simulation(&request).expect("valid request");
        let report = analyze(&request, &result, &AnalysisOptions::default()).expect("valid");
        let growth = report.growth_rates.expect("growth summary");
        assert_eq!(growth.quarters.len(), 1);
        assert!(report.funnel_efficiency.is_some());
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: AnalysisOptions =
            serde_json::from_str(r#"{"stage":"growth","fixedCosts":1000}"#).expect("json");
        assert_eq!(options.stage, Stage::Growth);
        assert_eq!(options.fixed_costs, Some(1_000.0));
        assert_eq!(options.fixed_marketing_ratio, 0.5);
        assert_eq!(options.fixed_cost_share, 0.7);
    }
}

mod calendar;
mod channels;
mod engine;
mod error;
mod funnel;
mod growth;
pub mod marketplace;
mod metric;
mod quarterly;
mod scenario;
pub mod subscription;
pub mod supplier;
mod types;
pub mod unit_economics;
mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use calendar::{MonthKey, parse_horizon, run_quarter};
pub use channels::{ChannelAllocation, ChannelShare, allocate};
pub use engine::{merge_hybrid, run_simulation};
pub use error::SimulationError;
pub use funnel::{
    FunnelEfficiency, FunnelGrade, FunnelStepValue, analyze_funnel_efficiency, conversion_rate,
    convert, funnel_step_values,
};
pub use growth::{
    GrowthFactors, GrowthQuarter, GrowthRateSummary, GrowthValues, apply_growth_rates,
    find_growth_rate, growth_factors, growth_rate_factor, growth_rate_summary,
};
pub use metric::{Metric, profit_margin, round_count, safe_div};
pub use quarterly::{
    BaseMetrics, QuarterRef, QuarterlyCoverage, analyze_quarterly_coverage,
    apply_quarterly_overrides, find_quarterly_metrics, is_override_applicable,
};
pub use scenario::{
    ScenarioComparison, ScenarioKind, ScenarioMultipliers, ScenarioOutcome, apply_scenario,
    run_scenarios,
};
pub use supplier::{ASSUMED_SUPPLIER_ORDER_VALUE, SupplierStep};
pub use types::{
    Adjustments, BusinessType, ChannelInfo, ConversionOverrides, CostInputs, CostOverrides,
    CustomFunnel, DEFAULT_MONTHS, FunnelStep, MAX_MONTHS, GrowthRateSettings, GrowthTargets, HybridMonth,
    HybridSummary, MarketplaceInputs, MarketplaceMonth, MarketplaceSummary, MetricOverrides,
    ModelKind, ModelMonth, ModelRun, MonthDetail, MonthlyResult, MonthlySeries, PricingOverrides,
    QuarterlyDetailedSettings, QuarterlyGrowthRate, QuarterlyMetrics, SimulationRequest,
    SimulationResult, SubscriptionInputs, SubscriptionMonth, SubscriptionSummary, SummaryDetail,
    SummaryResult, SupplierInfo, UnitEconomicsInputs, UnitEconomicsMonth, UnitEconomicsSummary,
};
pub use unit_economics::ASSUMED_LIFESPAN_MONTHS;
pub use validation::validate_request;


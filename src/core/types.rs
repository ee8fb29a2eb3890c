use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::calendar::MonthKey;
use super::metric::{Metric, profit_margin};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BusinessType {
    #[serde(rename = "saas", alias = "subscription")]
    Subscription,
    #[serde(
        rename = "manufacturing",
        alias = "unit-economics",
        alias = "unitEconomics"
    )]
    UnitEconomics,
    #[serde(rename = "b2c-platform", alias = "marketplace", alias = "b2cPlatform")]
    Marketplace,
    #[serde(rename = "hybrid")]
    Hybrid,
}

impl fmt::Display for BusinessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BusinessType::Subscription => "saas",
            BusinessType::UnitEconomics => "manufacturing",
            BusinessType::Marketplace => "b2c-platform",
            BusinessType::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// The simulator a set of per-month metrics belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ModelKind {
    Subscription,
    UnitEconomics,
    Marketplace,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostInputs {
    pub marketing_cost: f64,
    pub personnel_cost: f64,
    pub other_fixed_costs: f64,
    pub payment_fee_rate: f64,
    pub shipping_cost_per_unit: Option<f64>,
}

impl CostInputs {
    pub fn fixed_total(&self) -> f64 {
        self.marketing_cost + self.personnel_cost + self.other_fixed_costs
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub name: String,
    pub percentage: f64,
    #[serde(default)]
    pub cost_per_visitor: Option<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthTargets {
    pub revenue: bool,
    pub customers: bool,
    pub orders: bool,
}

impl Default for GrowthTargets {
    fn default() -> Self {
        Self {
            revenue: true,
            customers: true,
            orders: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyGrowthRate {
    pub quarter: u8,
    pub year: i32,
    pub growth_rate: f64,
    #[serde(default)]
    pub applies_to: GrowthTargets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthRateSettings {
    pub quarterly_rates: Vec<QuarterlyGrowthRate>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOverrides {
    pub visitor_to_signup: Option<f64>,
    pub visitor_to_buyer: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingOverrides {
    pub monthly_price: Option<f64>,
    pub unit_price: Option<f64>,
    pub average_order_value: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostOverrides {
    pub marketing_cost: Option<f64>,
    pub personnel_cost: Option<f64>,
    pub other_fixed_costs: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricOverrides {
    pub monthly_visitors: Option<f64>,
    pub monthly_sales: Option<f64>,
    pub churn_rate: Option<f64>,
    pub refund_rate: Option<f64>,
    pub take_rate: Option<f64>,
}

/// Absolute values that replace the base inputs for one run-quarter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyMetrics {
    pub quarter: u8,
    pub year: i32,
    #[serde(default)]
    pub conversion_rates: ConversionOverrides,
    #[serde(default)]
    pub pricing: PricingOverrides,
    #[serde(default)]
    pub costs: CostOverrides,
    #[serde(default)]
    pub metrics: MetricOverrides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuarterlyDetailedSettings {
    pub use_detailed_settings: bool,
    pub quarterly_metrics: Vec<QuarterlyMetrics>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub order: u32,
    pub conversion_rate: f64,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFunnel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<FunnelStep>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Growth, quarterly override and funnel settings shared by every model input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Adjustments {
    pub growth_rate_settings: GrowthRateSettings,
    pub quarterly_detailed_settings: QuarterlyDetailedSettings,
    pub custom_funnels: Vec<CustomFunnel>,
    pub active_funnel_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInputs {
    pub monthly_visitors: f64,
    #[serde(default)]
    pub channels: Vec<ChannelInfo>,
    pub visitor_to_signup_rate: f64,
    pub signup_to_paid_rate: f64,
    pub monthly_churn_rate: f64,
    pub monthly_price: f64,
    pub annual_price: f64,
    pub annual_discount_rate: f64,
    #[serde(flatten)]
    pub adjustments: Adjustments,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitEconomicsInputs {
    pub monthly_sales: f64,
    pub unit_price: f64,
    pub production_capacity: f64,
    pub material_cost_per_unit: f64,
    pub labor_cost_per_unit: f64,
    pub shipping_cost_per_unit: f64,
    pub other_variable_cost_per_unit: f64,
    #[serde(flatten)]
    pub adjustments: Adjustments,
}

impl UnitEconomicsInputs {
    pub fn variable_cost_per_unit(&self) -> f64 {
        self.material_cost_per_unit
            + self.labor_cost_per_unit
            + self.shipping_cost_per_unit
            + self.other_variable_cost_per_unit
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierInfo {
    pub new_suppliers_per_month: u64,
    pub active_suppliers: u64,
    pub average_listings_per_supplier: f64,
    pub average_revenue_per_supplier: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceInputs {
    pub monthly_visitors: f64,
    #[serde(default)]
    pub channels: Vec<ChannelInfo>,
    pub visitor_to_buyer_rate: f64,
    #[serde(default)]
    pub buyer_to_repeat_rate: f64,
    pub orders_per_buyer_per_month: f64,
    pub average_order_value: f64,
    pub refund_rate: f64,
    pub take_rate: f64,
    #[serde(default)]
    pub fixed_fee_per_order: f64,
    #[serde(default)]
    pub ad_revenue_per_month: f64,
    #[serde(default)]
    pub suppliers: Option<SupplierInfo>,
    #[serde(flatten)]
    pub adjustments: Adjustments,
}

pub const DEFAULT_MONTHS: u32 = 12;
/// Longest horizon a single run may step, one hundred years.
pub const MAX_MONTHS: u32 = 1200;

fn default_months() -> u32 {
    DEFAULT_MONTHS
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub business_type: BusinessType,
    pub cost_inputs: CostInputs,
    pub start_month: String,
    #[serde(default = "default_months")]
    pub months: u32,
    #[serde(default, alias = "saasInputs")]
    pub subscription: Option<SubscriptionInputs>,
    #[serde(default, alias = "manufacturingInputs")]
    pub unit_economics: Option<UnitEconomicsInputs>,
    #[serde(default, alias = "b2cPlatformInputs")]
    pub marketplace: Option<MarketplaceInputs>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionMonth {
    pub visitors: u64,
    pub signups: u64,
    pub paid_customers: u64,
    pub churned_customers: u64,
    pub active_customers: u64,
    pub mrr: f64,
    pub annual_contribution: f64,
    pub acquisition_spend: f64,
    pub marketing_spend: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitEconomicsMonth {
    pub sales: u64,
    pub production: u64,
    pub unit_price: f64,
    pub cost_of_goods_sold: f64,
    pub gross_margin: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceMonth {
    pub visitors: u64,
    pub buyers: u64,
    pub orders: u64,
    pub gmv: f64,
    pub refunds: f64,
    pub net_gmv: f64,
    pub platform_revenue: f64,
    /// Take rate in effect this month after quarterly overrides.
    pub take_rate: f64,
    pub active_suppliers: u64,
    pub supplier_revenue: f64,
    pub supplier_listings: f64,
    pub estimated_supplier_orders: u64,
    pub acquisition_spend: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridMonth {
    pub subscription: SubscriptionMonth,
    pub unit_economics: UnitEconomicsMonth,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum MonthDetail {
    Subscription(SubscriptionMonth),
    UnitEconomics(UnitEconomicsMonth),
    Marketplace(MarketplaceMonth),
    Hybrid(HybridMonth),
}

impl From<SubscriptionMonth> for MonthDetail {
    fn from(value: SubscriptionMonth) -> Self {
        MonthDetail::Subscription(value)
    }
}

impl From<UnitEconomicsMonth> for MonthDetail {
    fn from(value: UnitEconomicsMonth) -> Self {
        MonthDetail::UnitEconomics(value)
    }
}

impl From<MarketplaceMonth> for MonthDetail {
    fn from(value: MarketplaceMonth) -> Self {
        MonthDetail::Marketplace(value)
    }
}

impl From<HybridMonth> for MonthDetail {
    fn from(value: HybridMonth) -> Self {
        MonthDetail::Hybrid(value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyResult {
    pub revenue: f64,
    pub customers: u64,
    pub total_costs: f64,
    pub net_profit: f64,
    pub profit_margin: f64,
    pub detail: MonthDetail,
}

impl MonthlyResult {
    pub fn new(revenue: f64, customers: u64, total_costs: f64, detail: MonthDetail) -> Self {
        let net_profit = revenue - total_costs;
        Self {
            revenue,
            customers,
            total_costs,
            net_profit,
            profit_margin: profit_margin(net_profit, revenue),
            detail,
        }
    }

    fn unit_economics(&self) -> Option<&UnitEconomicsMonth> {
        match &self.detail {
            MonthDetail::UnitEconomics(unit) => Some(unit),
            MonthDetail::Hybrid(hybrid) => Some(&hybrid.unit_economics),
            _ => None,
        }
    }

    pub fn cost_of_goods_sold(&self) -> Option<f64> {
        self.unit_economics().map(|unit| unit.cost_of_goods_sold)
    }

    pub fn sales(&self) -> Option<u64> {
        self.unit_economics().map(|unit| unit.sales)
    }

    pub fn production(&self) -> Option<u64> {
        self.unit_economics().map(|unit| unit.production)
    }

    pub fn orders(&self) -> Option<u64> {
        match &self.detail {
            MonthDetail::Marketplace(market) => Some(market.orders),
            _ => None,
        }
    }

    pub fn mrr(&self) -> Option<f64> {
        match &self.detail {
            MonthDetail::Subscription(sub) => Some(sub.mrr),
            MonthDetail::Hybrid(hybrid) => Some(hybrid.subscription.mrr),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    pub total_new_paid_customers: u64,
    pub final_active_customers: u64,
    pub total_marketing_spend: f64,
    pub mrr: f64,
    pub arr: f64,
    pub ltv: Metric,
    pub cac: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitEconomicsSummary {
    pub total_sales: u64,
    pub total_cost_of_goods_sold: f64,
    pub total_gross_margin: f64,
    pub ltv: Metric,
    pub cac: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceSummary {
    pub total_orders: u64,
    pub total_gmv: f64,
    pub total_platform_revenue: f64,
    pub total_refunds: f64,
    pub average_take_rate: f64,
    pub final_active_suppliers: u64,
    pub ltv: Metric,
    pub cac: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridSummary {
    pub subscription: SubscriptionSummary,
    pub unit_economics: UnitEconomicsSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum SummaryDetail {
    Subscription(SubscriptionSummary),
    UnitEconomics(UnitEconomicsSummary),
    Marketplace(MarketplaceSummary),
    Hybrid(HybridSummary),
}

impl From<SubscriptionSummary> for SummaryDetail {
    fn from(value: SubscriptionSummary) -> Self {
        SummaryDetail::Subscription(value)
    }
}

impl From<UnitEconomicsSummary> for SummaryDetail {
    fn from(value: UnitEconomicsSummary) -> Self {
        SummaryDetail::UnitEconomics(value)
    }
}

impl From<MarketplaceSummary> for SummaryDetail {
    fn from(value: MarketplaceSummary) -> Self {
        SummaryDetail::Marketplace(value)
    }
}

impl From<HybridSummary> for SummaryDetail {
    fn from(value: HybridSummary) -> Self {
        SummaryDetail::Hybrid(value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub total_revenue: f64,
    pub total_customers: u64,
    pub total_costs: f64,
    pub net_profit: f64,
    pub average_profit_margin: f64,
    pub detail: SummaryDetail,
}

impl SummaryResult {
    /// LTV of the model that owns customer lifetime; hybrids report the subscription side.
    pub fn ltv(&self) -> Metric {
        match &self.detail {
            SummaryDetail::Subscription(s) => s.ltv,
            SummaryDetail::UnitEconomics(u) => u.ltv,
            SummaryDetail::Marketplace(m) => m.ltv,
            SummaryDetail::Hybrid(h) => h.subscription.ltv,
        }
    }

    pub fn cac(&self) -> f64 {
        match &self.detail {
            SummaryDetail::Subscription(s) => s.cac,
            SummaryDetail::UnitEconomics(u) => u.cac,
            SummaryDetail::Marketplace(m) => m.cac,
            SummaryDetail::Hybrid(h) => h.subscription.cac,
        }
    }

    pub fn mrr(&self) -> Option<f64> {
        match &self.detail {
            SummaryDetail::Subscription(s) => Some(s.mrr),
            SummaryDetail::Hybrid(h) => Some(h.subscription.mrr),
            _ => None,
        }
    }

    pub fn arr(&self) -> Option<f64> {
        self.mrr().map(|mrr| mrr * 12.0)
    }
}

pub type MonthlySeries = BTreeMap<MonthKey, MonthlyResult>;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub monthly: MonthlySeries,
    pub summary: SummaryResult,
}

/// One simulated month before the shared profit fields are derived.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelMonth<M> {
    pub key: MonthKey,
    pub revenue: f64,
    pub customers: u64,
    pub total_costs: f64,
    pub detail: M,
}

/// Typed output of a single simulator, kept until the run is finalized so
/// hybrid merging can work on concrete detail records.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelRun<M, S> {
    pub months: Vec<ModelMonth<M>>,
    pub total_customers: u64,
    pub summary: S,
}

impl<M, S> ModelRun<M, S>
where
    M: Into<MonthDetail>,
    S: Into<SummaryDetail>,
{
    pub fn into_result(self) -> SimulationResult {
        let mut total_revenue = 0.0;
        let mut total_costs = 0.0;
        let mut monthly = MonthlySeries::new();
        for month in self.months {
            total_revenue += month.revenue;
            total_costs += month.total_costs;
            monthly.insert(
                month.key,
                MonthlyResult::new(
                    month.revenue,
                    month.customers,
                    month.total_costs,
                    month.detail.into(),
                ),
            );
        }
        let net_profit = total_revenue - total_costs;
        SimulationResult {
            monthly,
            summary: SummaryResult {
                total_revenue,
                total_customers: self.total_customers,
                total_costs,
                net_profit,
                average_profit_margin: profit_margin(net_profit, total_revenue),
                detail: self.summary.into(),
            },
        }
    }
}

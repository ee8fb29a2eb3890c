use serde::Serialize;

use super::revenue_buckets;
use crate::core::{CostInputs, MonthlySeries, profit_margin, safe_div};

pub const DEFAULT_FIXED_MARKETING_RATIO: f64 = 0.5;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedCostBreakdown {
    pub personnel: f64,
    pub marketing: f64,
    pub other: f64,
    pub total: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCostBreakdown {
    pub marketing: f64,
    pub cost_of_goods_sold: f64,
    pub payment_fees: f64,
    pub shipping: f64,
    /// Costs the run charged that no other line accounts for.
    pub other: f64,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleEfficiencyPoint {
    pub revenue: f64,
    pub cost_ratio: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostStructureAnalysis {
    pub fixed_costs: FixedCostBreakdown,
    pub variable_costs: VariableCostBreakdown,
    pub total_costs: f64,
    pub fixed_cost_ratio: f64,
    pub variable_cost_ratio: f64,
    pub cost_to_revenue_ratio: f64,
    pub scale_efficiency: Vec<ScaleEfficiencyPoint>,
}

/// Splits the run's costs into fixed and variable parts.
///
/// `fixed_marketing_ratio` of the marketing budget is treated as fixed and the
/// rest as variable.
pub fn analyze_cost_structure(
    monthly: &MonthlySeries,
    costs: &CostInputs,
    fixed_marketing_ratio: f64,
) -> CostStructureAnalysis {
    if monthly.is_empty() {
        return CostStructureAnalysis::default();
    }
    let months = monthly.len() as f64;
    let total_revenue: f64 = monthly.values().map(|m| m.revenue).sum();
    let total_costs: f64 = monthly.values().map(|m| m.total_costs).sum();

    let fixed = {
        let personnel = costs.personnel_cost * months;
        let marketing = costs.marketing_cost * months * fixed_marketing_ratio;
        let other = costs.other_fixed_costs * months;
        FixedCostBreakdown {
            personnel,
            marketing,
            other,
            total: personnel + marketing + other,
        }
    };

    let marketing = costs.marketing_cost * months * (1.0 - fixed_marketing_ratio);
    let cost_of_goods_sold: f64 = monthly.values().filter_map(|m| m.cost_of_goods_sold()).sum();
    let payment_fees = total_revenue * costs.payment_fee_rate;
    let shipping = match costs.shipping_cost_per_unit {
        Some(per_unit) if per_unit > 0.0 => {
            let units: u64 = monthly.values().filter_map(|m| m.sales()).sum();
            units as f64 * per_unit
        }
        _ => 0.0,
    };
    let identified = fixed.total + marketing + cost_of_goods_sold + payment_fees + shipping;
    let other = (total_costs - identified).max(0.0);
    let variable = VariableCostBreakdown {
        marketing,
        cost_of_goods_sold,
        payment_fees,
        shipping,
        other,
        total: marketing + cost_of_goods_sold + payment_fees + shipping + other,
    };

    let scale_efficiency = revenue_buckets(monthly)
        .iter()
        .map(|bucket| ScaleEfficiencyPoint {
            revenue: bucket.average_revenue(),
            cost_ratio: safe_div(bucket.average_costs(), bucket.average_revenue()),
        })
        .collect();

    CostStructureAnalysis {
        fixed_cost_ratio: safe_div(fixed.total, total_costs),
        variable_cost_ratio: safe_div(variable.total, total_costs),
        cost_to_revenue_ratio: if total_revenue > 0.0 {
            total_costs / total_revenue
        } else {
            0.0
        },
        fixed_costs: fixed,
        variable_costs: variable,
        total_costs,
        scale_efficiency,
    }
}

/// Net margin implied by a cost structure, for callers holding only the analysis.
pub fn implied_margin(analysis: &CostStructureAnalysis) -> f64 {
    if analysis.cost_to_revenue_ratio > 0.0 {
        let revenue = analysis.total_costs / analysis.cost_to_revenue_ratio;
        profit_margin(revenue - analysis.total_costs, revenue)
    } else {
        0.0
    }
}

use serde::Serialize;

use crate::core::{Metric, MonthlySeries, SummaryResult, round_count};

pub const DEFAULT_FIXED_COST_SHARE: f64 = 0.7;
pub const DEFAULT_VARIABLE_COST_RATIO: f64 = 0.3;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenAnalysis {
    /// 1-indexed month in which cumulative contribution first covers the fixed base; 0 if never.
    pub break_even_month: u32,
    pub break_even_revenue: f64,
    pub break_even_customers: u64,
    pub monthly_break_even_revenue: Metric,
    pub annual_break_even_revenue: Metric,
    pub total_fixed_costs: f64,
    pub variable_cost_ratio: f64,
    pub contribution_margin_ratio: f64,
    pub revenue_gap_to_break_even: Metric,
}

impl BreakEvenAnalysis {
    fn empty() -> Self {
        Self {
            break_even_month: 0,
            break_even_revenue: 0.0,
            break_even_customers: 0,
            monthly_break_even_revenue: Metric::Finite(0.0),
            annual_break_even_revenue: Metric::Finite(0.0),
            total_fixed_costs: 0.0,
            variable_cost_ratio: DEFAULT_VARIABLE_COST_RATIO,
            contribution_margin_ratio: 1.0 - DEFAULT_VARIABLE_COST_RATIO,
            revenue_gap_to_break_even: Metric::Finite(0.0),
        }
    }
}

/// Revenue needed for `amount` of contribution at the given margin ratio.
fn revenue_for_contribution(amount: f64, contribution_margin_ratio: f64) -> Metric {
    if contribution_margin_ratio > 0.0 {
        Metric::Finite(amount / contribution_margin_ratio)
    } else if amount == 0.0 {
        Metric::Finite(0.0)
    } else {
        Metric::Unbounded
    }
}

fn annualize(monthly: Metric) -> Metric {
    match monthly {
        Metric::Finite(v) => Metric::Finite(v * 12.0),
        Metric::Unbounded => Metric::Unbounded,
    }
}

/// Walks the series until cumulative contribution covers the fixed-cost base.
///
/// `fixed_costs` defaults to 70% of the last month's total costs and
/// `variable_cost_ratio` to 0.3.
pub fn analyze_break_even(
    monthly: &MonthlySeries,
    fixed_costs: Option<f64>,
    variable_cost_ratio: Option<f64>,
) -> BreakEvenAnalysis {
    let Some(last) = monthly.values().next_back() else {
        return BreakEvenAnalysis::empty();
    };
    let total_fixed_costs = fixed_costs.unwrap_or(last.total_costs * DEFAULT_FIXED_COST_SHARE);
    let variable_cost_ratio = variable_cost_ratio.unwrap_or(DEFAULT_VARIABLE_COST_RATIO);
    let contribution_margin_ratio = 1.0 - variable_cost_ratio;
    let monthly_break_even_revenue =
        revenue_for_contribution(total_fixed_costs, contribution_margin_ratio);

    let mut cumulative_revenue = 0.0;
    let mut cumulative_profit = -total_fixed_costs;
    let mut reached = None;
    for (index, month) in monthly.values().enumerate() {
        cumulative_revenue += month.revenue;
        cumulative_profit += month.revenue * contribution_margin_ratio;
        if cumulative_profit >= 0.0 {
            reached = Some((index as u32 + 1, cumulative_revenue, month.customers));
            break;
        }
    }

    let (break_even_month, break_even_revenue, break_even_customers, revenue_gap_to_break_even) =
        match reached {
            Some((month, revenue, customers)) => (month, revenue, customers, Metric::Finite(0.0)),
            None => (
                0,
                0.0,
                0,
                revenue_for_contribution(cumulative_profit.abs(), contribution_margin_ratio),
            ),
        };

    BreakEvenAnalysis {
        break_even_month,
        break_even_revenue,
        break_even_customers,
        monthly_break_even_revenue,
        annual_break_even_revenue: annualize(monthly_break_even_revenue),
        total_fixed_costs,
        variable_cost_ratio,
        contribution_margin_ratio,
        revenue_gap_to_break_even,
    }
}

/// Break-even estimate from run totals alone, splitting total cost by `fixed_cost_share`.
pub fn analyze_break_even_from_summary(
    summary: &SummaryResult,
    months: u32,
    fixed_cost_share: f64,
) -> BreakEvenAnalysis {
    if months == 0 {
        return BreakEvenAnalysis::empty();
    }
    let total_fixed_costs = summary.total_costs * fixed_cost_share;
    let variable_cost_ratio = if summary.total_revenue > 0.0 {
        (summary.total_costs - total_fixed_costs) / summary.total_revenue
    } else {
        DEFAULT_VARIABLE_COST_RATIO
    };
    let contribution_margin_ratio = 1.0 - variable_cost_ratio;
    let monthly_break_even_revenue =
        revenue_for_contribution(total_fixed_costs / months as f64, contribution_margin_ratio);

    let reached = summary.net_profit >= 0.0;
    let cumulative_break_even = revenue_for_contribution(total_fixed_costs, contribution_margin_ratio);
    let mut break_even_month = 0;
    let mut break_even_revenue = 0.0;
    let mut break_even_customers = 0;
    if let (true, Metric::Finite(required)) = (reached, cumulative_break_even) {
        break_even_revenue = required;
        if summary.total_revenue > 0.0 {
            let share = required / summary.total_revenue;
            break_even_month = ((months as f64 * share).ceil() as u32).min(months);
        }
        break_even_customers = round_count(
            summary.total_customers as f64 * break_even_month as f64 / months as f64,
        );
    }

    BreakEvenAnalysis {
        break_even_month,
        break_even_revenue,
        break_even_customers,
        monthly_break_even_revenue,
        annual_break_even_revenue: annualize(monthly_break_even_revenue),
        total_fixed_costs,
        variable_cost_ratio,
        contribution_margin_ratio,
        revenue_gap_to_break_even: if reached {
            Metric::Finite(0.0)
        } else {
            revenue_for_contribution(summary.net_profit.abs(), contribution_margin_ratio)
        },
    }
}

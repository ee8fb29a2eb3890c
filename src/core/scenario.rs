use serde::Serialize;

use super::engine::run_simulation;
use super::error::SimulationError;
use super::types::{SimulationRequest, SimulationResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    Optimistic,
    Realistic,
    Pessimistic,
}

/// Input multipliers that define a scenario relative to the base request.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioMultipliers {
    /// Visitors, sales and the fixed-cost base scale together.
    pub volume: f64,
    pub conversion: f64,
    pub price: f64,
    /// Churn and refund rates.
    pub attrition: f64,
    /// Material and labor cost per unit.
    pub unit_cost: f64,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::Optimistic,
        ScenarioKind::Realistic,
        ScenarioKind::Pessimistic,
    ];

    pub fn multipliers(self) -> ScenarioMultipliers {
        match self {
            ScenarioKind::Optimistic => ScenarioMultipliers {
                volume: 1.2,
                conversion: 1.2,
                price: 1.1,
                attrition: 0.8,
                unit_cost: 0.9,
            },
            ScenarioKind::Realistic => ScenarioMultipliers {
                volume: 1.0,
                conversion: 1.0,
                price: 1.0,
                attrition: 1.0,
                unit_cost: 1.0,
            },
            ScenarioKind::Pessimistic => ScenarioMultipliers {
                volume: 0.8,
                conversion: 0.8,
                price: 0.9,
                attrition: 1.2,
                unit_cost: 1.1,
            },
        }
    }
}

fn scaled_rate(rate: f64, factor: f64) -> f64 {
    (rate * factor).clamp(0.0, 1.0)
}

/// Copy of `base` with the scenario multipliers applied to its inputs.
pub fn apply_scenario(base: &SimulationRequest, kind: ScenarioKind) -> SimulationRequest {
    let m = kind.multipliers();
    let mut request = base.clone();

    let costs = &mut request.cost_inputs;
    costs.marketing_cost = (costs.marketing_cost * m.volume).round();
    costs.personnel_cost = (costs.personnel_cost * m.volume).round();
    costs.other_fixed_costs = (costs.other_fixed_costs * m.volume).round();

    if let Some(sub) = request.subscription.as_mut() {
        sub.monthly_visitors = (sub.monthly_visitors * m.volume).round();
        sub.visitor_to_signup_rate = scaled_rate(sub.visitor_to_signup_rate, m.conversion);
        sub.signup_to_paid_rate = scaled_rate(sub.signup_to_paid_rate, m.conversion);
        sub.monthly_churn_rate = scaled_rate(sub.monthly_churn_rate, m.attrition);
        sub.monthly_price = (sub.monthly_price * m.price).round();
        sub.annual_price = (sub.annual_price * m.price).round();
    }
    if let Some(unit) = request.unit_economics.as_mut() {
        unit.monthly_sales = (unit.monthly_sales * m.volume).round();
        unit.unit_price = (unit.unit_price * m.price).round();
        unit.material_cost_per_unit = (unit.material_cost_per_unit * m.unit_cost).round();
        unit.labor_cost_per_unit = (unit.labor_cost_per_unit * m.unit_cost).round();
    }
    if let Some(market) = request.marketplace.as_mut() {
        market.monthly_visitors = (market.monthly_visitors * m.volume).round();
        market.visitor_to_buyer_rate = scaled_rate(market.visitor_to_buyer_rate, m.conversion);
        market.average_order_value = (market.average_order_value * m.price).round();
        market.take_rate = scaled_rate(market.take_rate, m.price);
        market.refund_rate = scaled_rate(market.refund_rate, m.attrition);
    }
    request
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub scenario: ScenarioKind,
    pub multipliers: ScenarioMultipliers,
    pub result: SimulationResult,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub optimistic: ScenarioOutcome,
    pub realistic: ScenarioOutcome,
    pub pessimistic: ScenarioOutcome,
    pub revenue_spread: f64,
    pub profit_spread: f64,
}

fn run_one(base: &SimulationRequest, scenario: ScenarioKind) -> Result<ScenarioOutcome, SimulationError> {
    Ok(ScenarioOutcome {
        scenario,
        multipliers: scenario.multipliers(),
        result: run_simulation(&apply_scenario(base, scenario))?,
    })
}

/// Runs the three scenarios independently; the first failing one aborts the comparison.
pub fn run_scenarios(base: &SimulationRequest) -> Result<ScenarioComparison, SimulationError> {
    let optimistic = run_one(base, ScenarioKind::Optimistic)?;
    let realistic = run_one(base, ScenarioKind::Realistic)?;
    let pessimistic = run_one(base, ScenarioKind::Pessimistic)?;
    let high = &optimistic.result.summary;
    let low = &pessimistic.result.summary;
    Ok(ScenarioComparison {
        revenue_spread: high.total_revenue - low.total_revenue,
        profit_spread: high.net_profit - low.net_profit,
        optimistic,
        realistic,
        pessimistic,
    })
}

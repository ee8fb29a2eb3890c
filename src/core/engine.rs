use tracing::{debug, warn};

use super::calendar::parse_horizon;
use super::error::SimulationError;
use super::marketplace;
use super::subscription::{self, SubscriptionRun};
use super::types::{
    BusinessType, HybridMonth, HybridSummary, ModelMonth, ModelRun, SimulationRequest,
    SimulationResult, SubscriptionInputs, UnitEconomicsInputs,
};
use super::unit_economics::{self, UnitEconomicsRun};

/// Runs the simulator selected by `request.business_type` over the requested horizon.
///
/// Fails before any month is stepped when the start month is malformed, the
/// horizon is empty, longer than [`MAX_MONTHS`](super::types::MAX_MONTHS) or
/// runs past 9999-12, or the inputs for the selected model are absent.
pub fn run_simulation(request: &SimulationRequest) -> Result<SimulationResult, SimulationError> {
    let start = parse_horizon(&request.start_month, request.months)?;
    let months = request.months;
    let costs = &request.cost_inputs;
    debug!(
        business_type = %request.business_type,
        start = %start,
        months,
        "running simulation"
    );

    let result = match request.business_type {
        BusinessType::Subscription => {
            let inputs = subscription_inputs(request)?;
            subscription::simulate(inputs, costs, start, months).into_result()
        }
        BusinessType::UnitEconomics => {
            let inputs = unit_economics_inputs(request)?;
            unit_economics::simulate(inputs, costs, start, months).into_result()
        }
        BusinessType::Marketplace => {
            let inputs = request
                .marketplace
                .as_ref()
                .ok_or(SimulationError::MissingInputs {
                    business_type: request.business_type,
                    missing: "marketplace",
                })?;
            marketplace::simulate(inputs, costs, start, months).into_result()
        }
        BusinessType::Hybrid => {
            let sub = subscription_inputs(request)?;
            let unit = unit_economics_inputs(request)?;
            merge_hybrid(
                subscription::simulate(sub, costs, start, months),
                unit_economics::simulate(unit, costs, start, months),
            )
            .into_result()
        }
    };

    if result.summary.ltv().is_unbounded() {
        warn!(
            business_type = %request.business_type,
            "lifetime value is unbounded; the churn proxy rate is zero"
        );
    }
    debug!(
        total_revenue = result.summary.total_revenue,
        net_profit = result.summary.net_profit,
        "simulation finished"
    );
    Ok(result)
}

fn subscription_inputs(request: &SimulationRequest) -> Result<&SubscriptionInputs, SimulationError> {
    request
        .subscription
        .as_ref()
        .ok_or(SimulationError::MissingInputs {
            business_type: request.business_type,
            missing: "subscription",
        })
}

fn unit_economics_inputs(
    request: &SimulationRequest,
) -> Result<&UnitEconomicsInputs, SimulationError> {
    request
        .unit_economics
        .as_ref()
        .ok_or(SimulationError::MissingInputs {
            business_type: request.business_type,
            missing: "unit economics",
        })
}

/// Sums two runs month by month.
///
/// Both sides charge the full fixed-cost base, so a hybrid carries marketing,
/// personnel and other fixed costs twice.
pub fn merge_hybrid(
    sub: SubscriptionRun,
    unit: UnitEconomicsRun,
) -> ModelRun<HybridMonth, HybridSummary> {
    let months = sub
        .months
        .into_iter()
        .zip(unit.months)
        .map(|(s, u)| ModelMonth {
            key: s.key,
            revenue: s.revenue + u.revenue,
            customers: s.customers + u.customers,
            total_costs: s.total_costs + u.total_costs,
            detail: HybridMonth {
                subscription: s.detail,
                unit_economics: u.detail,
            },
        })
        .collect();
    ModelRun {
        months,
        total_customers: sub.total_customers + unit.total_customers,
        summary: HybridSummary {
            subscription: sub.summary,
            unit_economics: unit.summary,
        },
    }
}

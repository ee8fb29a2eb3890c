use super::calendar::MonthKey;
use super::channels::allocate;
use super::funnel;
use super::growth::growth_factors;
use super::metric::{Metric, round_count, safe_div};
use super::quarterly::{BaseMetrics, apply_quarterly_overrides};
use super::types::{
    CostInputs, ModelKind, ModelMonth, ModelRun, SubscriptionInputs, SubscriptionMonth,
    SubscriptionSummary,
};

pub type SubscriptionRun = ModelRun<SubscriptionMonth, SubscriptionSummary>;

/// State carried from one month to the next.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SubscriptionState {
    pub active_customers: u64,
}

fn base_metrics(inputs: &SubscriptionInputs, costs: &CostInputs) -> BaseMetrics {
    BaseMetrics {
        conversion_rate: inputs.visitor_to_signup_rate,
        price: inputs.monthly_price,
        visitors: inputs.monthly_visitors,
        churn_rate: inputs.monthly_churn_rate,
        ..BaseMetrics::from_costs(costs)
    }
}

/// Steps one month and returns its record with the state for the next month.
pub fn step_month(
    inputs: &SubscriptionInputs,
    costs: &CostInputs,
    key: MonthKey,
    month_index: u32,
    base_year: i32,
    state: SubscriptionState,
) -> (ModelMonth<SubscriptionMonth>, SubscriptionState) {
    let adj = &inputs.adjustments;
    let base = apply_quarterly_overrides(
        month_index,
        base_year,
        &adj.quarterly_detailed_settings,
        ModelKind::Subscription,
        base_metrics(inputs, costs),
    );
    let factors = growth_factors(month_index, base_year, &adj.growth_rate_settings);

    let acquisition = allocate(base.visitors, &inputs.channels);
    let signups = round_count(funnel::convert(
        base.visitors,
        &adj.custom_funnels,
        adj.active_funnel_id.as_deref(),
        base.conversion_rate,
    ));
    let paid_customers =
        round_count(signups as f64 * inputs.signup_to_paid_rate * factors.customers);
    let churned_customers = round_count(state.active_customers as f64 * base.churn_rate);
    let active_customers = (state.active_customers + paid_customers).saturating_sub(churned_customers);

    let active = active_customers as f64;
    let mrr = active * base.price * factors.revenue;
    let annual_contribution = active * inputs.annual_price * (1.0 - inputs.annual_discount_rate)
        / 12.0
        * factors.revenue;
    let revenue = mrr + annual_contribution;
    let marketing_spend = base.marketing_cost + acquisition.total_cost;
    let total_costs = base.fixed_costs() + acquisition.total_cost + costs.payment_fee_rate * revenue;

    let month = ModelMonth {
        key,
        revenue,
        customers: active_customers,
        total_costs,
        detail: SubscriptionMonth {
            visitors: round_count(base.visitors),
            signups,
            paid_customers,
            churned_customers,
            active_customers,
            mrr,
            annual_contribution,
            acquisition_spend: acquisition.total_cost,
            marketing_spend,
        },
    };
    (month, SubscriptionState { active_customers })
}

pub fn simulate(
    inputs: &SubscriptionInputs,
    costs: &CostInputs,
    start: MonthKey,
    months: u32,
) -> SubscriptionRun {
    let base_year = start.year();
    let mut state = SubscriptionState::default();
    let mut records = Vec::with_capacity(months as usize);
    let mut total_new_paid = 0u64;
    let mut total_marketing_spend = 0.0;

    for (index, key) in start.range(months).enumerate() {
        let (month, next) = step_month(inputs, costs, key, index as u32, base_year, state);
        total_new_paid += month.detail.paid_customers;
        total_marketing_spend += month.detail.marketing_spend;
        state = next;
        records.push(month);
    }

    let mrr = records.last().map(|m| m.detail.mrr).unwrap_or(0.0);
    let summary = SubscriptionSummary {
        total_new_paid_customers: total_new_paid,
        final_active_customers: state.active_customers,
        total_marketing_spend,
        mrr,
        arr: mrr * 12.0,
        ltv: Metric::ratio(inputs.monthly_price, inputs.monthly_churn_rate),
        cac: safe_div(total_marketing_spend, total_new_paid as f64),
    };
    ModelRun {
        months: records,
        total_customers: total_new_paid,
        summary,
    }
}

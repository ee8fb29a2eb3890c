use std::collections::HashSet;

use super::calendar::parse_horizon;
use super::error::SimulationError;
use super::types::{
    Adjustments, BusinessType, ChannelInfo, CostInputs, MarketplaceInputs, SimulationRequest,
    SubscriptionInputs, UnitEconomicsInputs,
};

const UNIT_INTERVAL: &str = "between 0 and 1";
const NON_NEGATIVE: &str = "non-negative";

fn rate(field: impl Into<String>, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimulationError::OutOfRange {
            field: field.into(),
            expected: UNIT_INTERVAL,
            value,
        })
    }
}

fn non_negative(field: impl Into<String>, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::OutOfRange {
            field: field.into(),
            expected: NON_NEGATIVE,
            value,
        })
    }
}

fn optional<F>(value: Option<f64>, check: F) -> Result<(), SimulationError>
where
    F: FnOnce(f64) -> Result<(), SimulationError>,
{
    value.map_or(Ok(()), check)
}

/// Rejects requests the engine would run but whose inputs are out of domain.
///
/// The engine itself only refuses structurally unusable requests; everything
/// else here (rates outside `[0, 1]`, negative volumes, quarter numbers outside
/// `1..=4`, growth below -100%, duplicate quarter entries) is caught before a
/// run is started.
pub fn validate_request(request: &SimulationRequest) -> Result<(), SimulationError> {
    parse_horizon(&request.start_month, request.months)?;
    validate_costs(&request.cost_inputs)?;

    let business_type = request.business_type;
    let missing = |missing: &'static str| SimulationError::MissingInputs {
        business_type,
        missing,
    };
    match business_type {
        BusinessType::Subscription => {
            validate_subscription(request.subscription.as_ref().ok_or(missing("subscription"))?)?;
        }
        BusinessType::UnitEconomics => {
            validate_unit_economics(
                request
                    .unit_economics
                    .as_ref()
                    .ok_or(missing("unit economics"))?,
            )?;
        }
        BusinessType::Marketplace => {
            validate_marketplace(request.marketplace.as_ref().ok_or(missing("marketplace"))?)?;
        }
        BusinessType::Hybrid => {
            validate_subscription(request.subscription.as_ref().ok_or(missing("subscription"))?)?;
            validate_unit_economics(
                request
                    .unit_economics
                    .as_ref()
                    .ok_or(missing("unit economics"))?,
            )?;
        }
    }
    Ok(())
}

fn validate_costs(costs: &CostInputs) -> Result<(), SimulationError> {
    non_negative("costInputs.marketingCost", costs.marketing_cost)?;
    non_negative("costInputs.personnelCost", costs.personnel_cost)?;
    non_negative("costInputs.otherFixedCosts", costs.other_fixed_costs)?;
    rate("costInputs.paymentFeeRate", costs.payment_fee_rate)?;
    optional(costs.shipping_cost_per_unit, |v| {
        non_negative("costInputs.shippingCostPerUnit", v)
    })
}

fn validate_channels(prefix: &str, channels: &[ChannelInfo]) -> Result<(), SimulationError> {
    for (i, channel) in channels.iter().enumerate() {
        rate(format!("{prefix}.channels[{i}].percentage"), channel.percentage)?;
        optional(channel.cost_per_visitor, |v| {
            non_negative(format!("{prefix}.channels[{i}].costPerVisitor"), v)
        })?;
    }
    Ok(())
}

fn validate_subscription(inputs: &SubscriptionInputs) -> Result<(), SimulationError> {
    let p = "subscription";
    non_negative(format!("{p}.monthlyVisitors"), inputs.monthly_visitors)?;
    rate(format!("{p}.visitorToSignupRate"), inputs.visitor_to_signup_rate)?;
    rate(format!("{p}.signupToPaidRate"), inputs.signup_to_paid_rate)?;
    rate(format!("{p}.monthlyChurnRate"), inputs.monthly_churn_rate)?;
    non_negative(format!("{p}.monthlyPrice"), inputs.monthly_price)?;
    non_negative(format!("{p}.annualPrice"), inputs.annual_price)?;
    rate(format!("{p}.annualDiscountRate"), inputs.annual_discount_rate)?;
    validate_channels(p, &inputs.channels)?;
    validate_adjustments(p, &inputs.adjustments)
}

fn validate_unit_economics(inputs: &UnitEconomicsInputs) -> Result<(), SimulationError> {
    let p = "unitEconomics";
    non_negative(format!("{p}.monthlySales"), inputs.monthly_sales)?;
    non_negative(format!("{p}.unitPrice"), inputs.unit_price)?;
    non_negative(format!("{p}.productionCapacity"), inputs.production_capacity)?;
    non_negative(format!("{p}.materialCostPerUnit"), inputs.material_cost_per_unit)?;
    non_negative(format!("{p}.laborCostPerUnit"), inputs.labor_cost_per_unit)?;
    non_negative(format!("{p}.shippingCostPerUnit"), inputs.shipping_cost_per_unit)?;
    non_negative(
        format!("{p}.otherVariableCostPerUnit"),
        inputs.other_variable_cost_per_unit,
    )?;
    validate_adjustments(p, &inputs.adjustments)
}

fn validate_marketplace(inputs: &MarketplaceInputs) -> Result<(), SimulationError> {
    let p = "marketplace";
    non_negative(format!("{p}.monthlyVisitors"), inputs.monthly_visitors)?;
    rate(format!("{p}.visitorToBuyerRate"), inputs.visitor_to_buyer_rate)?;
    rate(format!("{p}.buyerToRepeatRate"), inputs.buyer_to_repeat_rate)?;
    non_negative(
        format!("{p}.ordersPerBuyerPerMonth"),
        inputs.orders_per_buyer_per_month,
    )?;
    non_negative(format!("{p}.averageOrderValue"), inputs.average_order_value)?;
    rate(format!("{p}.refundRate"), inputs.refund_rate)?;
    rate(format!("{p}.takeRate"), inputs.take_rate)?;
    non_negative(format!("{p}.fixedFeePerOrder"), inputs.fixed_fee_per_order)?;
    non_negative(format!("{p}.adRevenuePerMonth"), inputs.ad_revenue_per_month)?;
    if let Some(suppliers) = &inputs.suppliers {
        non_negative(
            format!("{p}.suppliers.averageListingsPerSupplier"),
            suppliers.average_listings_per_supplier,
        )?;
        non_negative(
            format!("{p}.suppliers.averageRevenuePerSupplier"),
            suppliers.average_revenue_per_supplier,
        )?;
    }
    validate_channels(p, &inputs.channels)?;
    validate_adjustments(p, &inputs.adjustments)
}

fn quarter(field: String, quarter: u8) -> Result<(), SimulationError> {
    if (1..=4).contains(&quarter) {
        Ok(())
    } else {
        Err(SimulationError::OutOfRange {
            field,
            expected: "between 1 and 4",
            value: quarter as f64,
        })
    }
}

fn validate_adjustments(prefix: &str, adj: &Adjustments) -> Result<(), SimulationError> {
    let mut seen = HashSet::new();
    for (i, entry) in adj.growth_rate_settings.quarterly_rates.iter().enumerate() {
        let field = format!("{prefix}.growthRateSettings.quarterlyRates[{i}]");
        quarter(format!("{field}.quarter"), entry.quarter)?;
        if !entry.growth_rate.is_finite() || entry.growth_rate < -1.0 {
            return Err(SimulationError::OutOfRange {
                field: format!("{field}.growthRate"),
                expected: "at least -1",
                value: entry.growth_rate,
            });
        }
        if !seen.insert((entry.quarter, entry.year)) {
            return Err(SimulationError::DuplicateQuarter {
                schedule: "growth rate",
                quarter: entry.quarter,
                year: entry.year,
            });
        }
    }

    let mut seen = HashSet::new();
    for (i, bundle) in adj.quarterly_detailed_settings.quarterly_metrics.iter().enumerate() {
        let field = format!("{prefix}.quarterlyDetailedSettings.quarterlyMetrics[{i}]");
        quarter(format!("{field}.quarter"), bundle.quarter)?;
        if !seen.insert((bundle.quarter, bundle.year)) {
            return Err(SimulationError::DuplicateQuarter {
                schedule: "quarterly override",
                quarter: bundle.quarter,
                year: bundle.year,
            });
        }
        let conv = &bundle.conversion_rates;
        optional(conv.visitor_to_signup, |v| rate(format!("{field}.visitorToSignup"), v))?;
        optional(conv.visitor_to_buyer, |v| rate(format!("{field}.visitorToBuyer"), v))?;
        let pricing = &bundle.pricing;
        optional(pricing.monthly_price, |v| non_negative(format!("{field}.monthlyPrice"), v))?;
        optional(pricing.unit_price, |v| non_negative(format!("{field}.unitPrice"), v))?;
        optional(pricing.average_order_value, |v| {
            non_negative(format!("{field}.averageOrderValue"), v)
        })?;
        let costs = &bundle.costs;
        optional(costs.marketing_cost, |v| non_negative(format!("{field}.marketingCost"), v))?;
        optional(costs.personnel_cost, |v| non_negative(format!("{field}.personnelCost"), v))?;
        optional(costs.other_fixed_costs, |v| {
            non_negative(format!("{field}.otherFixedCosts"), v)
        })?;
        let metrics = &bundle.metrics;
        optional(metrics.monthly_visitors, |v| {
            non_negative(format!("{field}.monthlyVisitors"), v)
        })?;
        optional(metrics.monthly_sales, |v| non_negative(format!("{field}.monthlySales"), v))?;
        optional(metrics.churn_rate, |v| rate(format!("{field}.churnRate"), v))?;
        optional(metrics.refund_rate, |v| rate(format!("{field}.refundRate"), v))?;
        optional(metrics.take_rate, |v| rate(format!("{field}.takeRate"), v))?;
    }

    for funnel in &adj.custom_funnels {
        for (i, step) in funnel.steps.iter().enumerate() {
            rate(
                format!("{prefix}.customFunnels[{}].steps[{i}].conversionRate", funnel.id),
                step.conversion_rate,
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures;
    use crate::core::types::{
        CustomFunnel, FunnelStep, GrowthTargets, MAX_MONTHS, QuarterlyDetailedSettings,
        QuarterlyGrowthRate, QuarterlyMetrics,
    };

    fn growth(quarter: u8, year: i32, growth_rate: f64) -> QuarterlyGrowthRate {
        QuarterlyGrowthRate {
            quarter,
            year,
            growth_rate,
            applies_to: GrowthTargets::default(),
            description: None,
        }
    }

    fn bundle(quarter: u8, year: i32) -> QuarterlyMetrics {
        QuarterlyMetrics {
            quarter,
            year,
            conversion_rates: Default::default(),
            pricing: Default::default(),
            costs: Default::default(),
            metrics: Default::default(),
            description: None,
        }
    }

    #[test]
    fn sample_requests_are_valid() {
        for business_type in [
            BusinessType::Subscription,
            BusinessType::UnitEconomics,
            BusinessType::Marketplace,
            BusinessType::Hybrid,
        ] {
            assert_eq!(validate_request(&fixtures::request(business_type, 12)), Ok(()));
        }
    }

    #[test]
    fn rates_outside_unit_interval_are_rejected() {
        let mut request = fixtures::request(BusinessType::Subscription, 12);
        if let Some(inputs) = request.subscription.as_mut() {
            inputs.monthly_churn_rate = 1.5;
        }
        assert_eq!(
            validate_request(&request),
            Err(SimulationError::OutOfRange {
                field: "subscription.monthlyChurnRate".to_string(),
                expected: UNIT_INTERVAL,
                value: 1.5,
            })
        );
    }

    #[test]
    fn unused_model_inputs_are_not_checked() {
        let mut request = fixtures::request(BusinessType::UnitEconomics, 12);
        if let Some(inputs) = request.marketplace.as_mut() {
            inputs.take_rate = -3.0;
        }
        assert_eq!(validate_request(&request), Ok(()));
    }

    #[test]
    fn duplicate_growth_quarters_are_rejected() {
        let mut request = fixtures::request(BusinessType::Subscription, 12);
        if let Some(inputs) = request.subscription.as_mut() {
            inputs.adjustments.growth_rate_settings.quarterly_rates =
                vec![growth(1, 2025, 0.1), growth(2, 2025, 0.1), growth(1, 2025, 0.3)];
        }
        assert_eq!(
            validate_request(&request),
            Err(SimulationError::DuplicateQuarter {
                schedule: "growth rate",
                quarter: 1,
                year: 2025,
            })
        );
    }

    #[test]
    fn growth_bounds_and_quarter_range() {
        let mut request = fixtures::request(BusinessType::Marketplace, 12);
        if let Some(inputs) = request.marketplace.as_mut() {
            inputs.adjustments.growth_rate_settings.quarterly_rates = vec![growth(1, 2025, -1.0)];
        }
        assert_eq!(validate_request(&request), Ok(()));

        if let Some(inputs) = request.marketplace.as_mut() {
            inputs.adjustments.growth_rate_settings.quarterly_rates = vec![growth(1, 2025, -1.01)];
        }
        assert!(matches!(
            validate_request(&request),
            Err(SimulationError::OutOfRange { expected: "at least -1", .. })
        ));

        if let Some(inputs) = request.marketplace.as_mut() {
            inputs.adjustments.growth_rate_settings.quarterly_rates = vec![growth(5, 2025, 0.1)];
        }
        assert!(matches!(
            validate_request(&request),
            Err(SimulationError::OutOfRange { expected: "between 1 and 4", .. })
        ));
    }

    #[test]
    fn duplicate_override_quarters_and_bad_funnel_steps() {
        let mut request = fixtures::request(BusinessType::UnitEconomics, 12);
        if let Some(inputs) = request.unit_economics.as_mut() {
            inputs.adjustments.quarterly_detailed_settings = QuarterlyDetailedSettings {
                use_detailed_settings: true,
                quarterly_metrics: vec![bundle(3, 2025), bundle(3, 2025)],
            };
        }
        assert!(matches!(
            validate_request(&request),
            Err(SimulationError::DuplicateQuarter { schedule: "quarterly override", quarter: 3, .. })
        ));

        let mut request = fixtures::request(BusinessType::Subscription, 12);
        if let Some(inputs) = request.subscription.as_mut() {
            inputs.adjustments.custom_funnels = vec![CustomFunnel {
                id: "main".to_string(),
                name: String::new(),
                steps: vec![FunnelStep {
                    id: None,
                    name: "visit".to_string(),
                    order: 1,
                    conversion_rate: 1.2,
                }],
                is_active: true,
            }];
        }
        assert!(matches!(
            validate_request(&request),
            Err(SimulationError::OutOfRange { ref field, .. }) if field == "subscription.customFunnels[main].steps[0].conversionRate"
        ));
    }

    #[test]
    fn missing_and_structural_errors_come_first() {
        let mut request = fixtures::request(BusinessType::Hybrid, 12);
        request.subscription = None;
        assert!(matches!(
            validate_request(&request),
            Err(SimulationError::MissingInputs { missing: "subscription", .. })
        ));
        let mut request = fixtures::request(BusinessType::Hybrid, 0);
        request.start_month = "2025-01".to_string();
        assert_eq!(validate_request(&request), Err(SimulationError::InvalidMonthCount));
    }

    #[test]
    fn horizon_limits_are_checked_before_inputs() {
        let request = fixtures::request(BusinessType::Subscription, u32::MAX);
        assert_eq!(validate_request(&request), Err(SimulationError::InvalidMonthCount));
        let request = fixtures::request(BusinessType::Subscription, MAX_MONTHS);
        assert_eq!(validate_request(&request), Ok(()));

        let mut request = fixtures::request(BusinessType::Marketplace, 2);
        request.start_month = "9999-12".to_string();
        assert!(matches!(
            validate_request(&request),
            Err(SimulationError::HorizonPastCalendar { months: 2, .. })
        ));
    }
}

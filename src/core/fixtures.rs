//! Sample inputs shared by the unit tests across `core` and `analysis`.

use super::types::{
    Adjustments, BusinessType, CostInputs, MarketplaceInputs, SimulationRequest,
    SubscriptionInputs, UnitEconomicsInputs,
};

pub fn costs() -> CostInputs {
    CostInputs {
        marketing_cost: 2_000_000.0,
        personnel_cost: 5_000_000.0,
        other_fixed_costs: 1_000_000.0,
        payment_fee_rate: 0.03,
        shipping_cost_per_unit: None,
    }
}

pub fn subscription() -> SubscriptionInputs {
    SubscriptionInputs {
        monthly_visitors: 10_000.0,
        channels: Vec::new(),
        visitor_to_signup_rate: 0.05,
        signup_to_paid_rate: 0.20,
        monthly_churn_rate: 0.03,
        monthly_price: 50_000.0,
        annual_price: 500_000.0,
        annual_discount_rate: 0.10,
        adjustments: Adjustments::default(),
    }
}

pub fn unit_economics() -> UnitEconomicsInputs {
    UnitEconomicsInputs {
        monthly_sales: 2_000.0,
        unit_price: 10_000.0,
        production_capacity: 1_500.0,
        material_cost_per_unit: 3_000.0,
        labor_cost_per_unit: 1_500.0,
        shipping_cost_per_unit: 300.0,
        other_variable_cost_per_unit: 200.0,
        adjustments: Adjustments::default(),
    }
}

pub fn marketplace() -> MarketplaceInputs {
    MarketplaceInputs {
        monthly_visitors: 50_000.0,
        channels: Vec::new(),
        visitor_to_buyer_rate: 0.02,
        buyer_to_repeat_rate: 0.3,
        orders_per_buyer_per_month: 2.0,
        average_order_value: 30_000.0,
        refund_rate: 0.05,
        take_rate: 0.10,
        fixed_fee_per_order: 1_000.0,
        ad_revenue_per_month: 500_000.0,
        suppliers: None,
        adjustments: Adjustments::default(),
    }
}

pub fn request(business_type: BusinessType, months: u32) -> SimulationRequest {
    SimulationRequest {
        business_type,
        cost_inputs: costs(),
        start_month: "2025-01".to_string(),
        months,
        subscription: Some(subscription()),
        unit_economics: Some(unit_economics()),
        marketplace: Some(marketplace()),
    }
}

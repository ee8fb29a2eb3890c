use super::metric::round_count;
use super::types::SupplierInfo;

/// Order value used to turn supplier revenue into an order estimate.
pub const ASSUMED_SUPPLIER_ORDER_VALUE: f64 = 30_000.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SupplierStep {
    pub total_listings: f64,
    pub total_revenue: f64,
    pub estimated_orders: u64,
}

pub fn step(active_suppliers: u64, info: &SupplierInfo) -> SupplierStep {
    let active = active_suppliers as f64;
    let total_revenue = active * info.average_revenue_per_supplier;
    SupplierStep {
        total_listings: active * info.average_listings_per_supplier,
        total_revenue,
        estimated_orders: round_count(total_revenue / ASSUMED_SUPPLIER_ORDER_VALUE),
    }
}

/// Next month's active suppliers. Suppliers never churn.
pub fn advance(active_suppliers: u64, info: &SupplierInfo) -> u64 {
    active_suppliers.saturating_add(info.new_suppliers_per_month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> SupplierInfo {
        SupplierInfo {
            new_suppliers_per_month: 5,
            active_suppliers: 20,
            average_listings_per_supplier: 12.5,
            average_revenue_per_supplier: 450_000.0,
        }
    }

    #[test]
    fn step_derives_listings_revenue_and_orders() {
        let out = step(20, &info());
        assert_eq!(out.total_listings, 250.0);
        assert_eq!(out.total_revenue, 9_000_000.0);
        assert_eq!(out.estimated_orders, 300);
    }

    #[test]
    fn advance_only_adds() {
        let info = info();
        let mut active = info.active_suppliers;
        for _ in 0..3 {
            active = advance(active, &info);
        }
        assert_eq!(active, 35);
        assert_eq!(step(0, &info).estimated_orders, 0);
    }
}

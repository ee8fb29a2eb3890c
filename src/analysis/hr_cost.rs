use serde::{Deserialize, Serialize};

use crate::core::{MonthlySeries, safe_div};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub name: String,
    pub headcount: u32,
    /// Monthly salary per head.
    pub average_salary: f64,
}

impl Department {
    fn new(name: &str, headcount: u32, average_salary: f64) -> Self {
        Self {
            name: name.to_string(),
            headcount,
            average_salary,
        }
    }
}

/// Roster assumed when the caller supplies none.
pub fn default_departments() -> Vec<Department> {
    vec![
        Department::new("Engineering", 3, 7_000_000.0),
        Department::new("Sales & Marketing", 2, 6_000_000.0),
        Department::new("Operations & Support", 1, 5_000_000.0),
        Department::new("Executive", 1, 10_000_000.0),
    ]
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCost {
    pub name: String,
    pub headcount: u32,
    pub average_salary: f64,
    pub total_cost: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HrCostAnalysis {
    pub department_costs: Vec<DepartmentCost>,
    pub total_hr_cost: f64,
    pub hr_to_revenue_ratio: f64,
    pub total_headcount: u32,
    pub revenue_per_employee: f64,
}

/// Payroll over the run's horizon against its total revenue.
pub fn analyze_hr_costs(monthly: &MonthlySeries, departments: Option<&[Department]>) -> HrCostAnalysis {
    if monthly.is_empty() {
        return HrCostAnalysis::default();
    }
    let months = monthly.len() as f64;
    let total_revenue: f64 = monthly.values().map(|m| m.revenue).sum();

    let defaults;
    let departments = match departments {
        Some(departments) => departments,
        None => {
            defaults = default_departments();
            &defaults[..]
        }
    };
    let department_costs: Vec<DepartmentCost> = departments
        .iter()
        .map(|dept| DepartmentCost {
            name: dept.name.clone(),
            headcount: dept.headcount,
            average_salary: dept.average_salary,
            total_cost: f64::from(dept.headcount) * dept.average_salary * months,
        })
        .collect();
    let total_hr_cost: f64 = department_costs.iter().map(|d| d.total_cost).sum();
    let total_headcount: u32 = department_costs.iter().map(|d| d.headcount).sum();

    HrCostAnalysis {
        hr_to_revenue_ratio: safe_div(total_hr_cost, total_revenue),
        revenue_per_employee: safe_div(total_revenue, f64::from(total_headcount)),
        department_costs,
        total_hr_cost,
        total_headcount,
    }
}

//! Static industry benchmarks and a scored comparison of a run against them.
//!
//! Rates are compared as fractions (0.05, not 5%).

use serde::{Deserialize, Serialize};

use crate::core::{BusinessType, Metric, SimulationRequest, SimulationResult};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    #[default]
    Startup,
    Growth,
    Mature,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionBenchmarks {
    pub visitor_to_signup: Option<f64>,
    pub signup_to_paid: Option<f64>,
    pub visitor_to_buyer: Option<f64>,
    pub buyer_to_repeat: Option<f64>,
}

const NO_CONVERSION: ConversionBenchmarks = ConversionBenchmarks {
    visitor_to_signup: None,
    signup_to_paid: None,
    visitor_to_buyer: None,
    buyer_to_repeat: None,
};

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryBenchmark {
    pub industry: &'static str,
    pub business_type: BusinessType,
    pub stage: Stage,
    pub conversion_rates: ConversionBenchmarks,
    pub monthly_churn_rate: f64,
    pub annual_churn_rate: f64,
    pub gross_margin: f64,
    pub net_margin: f64,
    pub cost_to_revenue_ratio: f64,
    pub monthly_revenue_growth: f64,
    pub customer_growth: f64,
    pub ltv: f64,
    pub cac: f64,
    pub ltv_cac_ratio: f64,
    pub payback_months: f64,
    pub revenue_per_employee: f64,
    pub hr_to_revenue_ratio: f64,
}

static BENCHMARKS: [IndustryBenchmark; 4] = [
    IndustryBenchmark {
        industry: "SaaS",
        business_type: BusinessType::Subscription,
        stage: Stage::Startup,
        conversion_rates: ConversionBenchmarks {
            visitor_to_signup: Some(0.03),
            signup_to_paid: Some(0.15),
            ..NO_CONVERSION
        },
        monthly_churn_rate: 0.05,
        annual_churn_rate: 0.45,
        gross_margin: 0.80,
        net_margin: -0.20,
        cost_to_revenue_ratio: 1.20,
        monthly_revenue_growth: 0.20,
        customer_growth: 0.15,
        ltv: 2_400.0,
        cac: 800.0,
        ltv_cac_ratio: 3.0,
        payback_months: 8.0,
        revenue_per_employee: 50_000_000.0,
        hr_to_revenue_ratio: 0.60,
    },
    IndustryBenchmark {
        industry: "SaaS",
        business_type: BusinessType::Subscription,
        stage: Stage::Growth,
        conversion_rates: ConversionBenchmarks {
            visitor_to_signup: Some(0.05),
            signup_to_paid: Some(0.20),
            ..NO_CONVERSION
        },
        monthly_churn_rate: 0.03,
        annual_churn_rate: 0.30,
        gross_margin: 0.85,
        net_margin: 0.10,
        cost_to_revenue_ratio: 0.90,
        monthly_revenue_growth: 0.15,
        customer_growth: 0.12,
        ltv: 4_800.0,
        cac: 1_200.0,
        ltv_cac_ratio: 4.0,
        payback_months: 6.0,
        revenue_per_employee: 80_000_000.0,
        hr_to_revenue_ratio: 0.45,
    },
    IndustryBenchmark {
        industry: "Manufacturing & Distribution",
        business_type: BusinessType::UnitEconomics,
        stage: Stage::Startup,
        conversion_rates: NO_CONVERSION,
        monthly_churn_rate: 0.02,
        annual_churn_rate: 0.20,
        gross_margin: 0.40,
        net_margin: 0.05,
        cost_to_revenue_ratio: 0.95,
        monthly_revenue_growth: 0.10,
        customer_growth: 0.08,
        ltv: 1_200.0,
        cac: 200.0,
        ltv_cac_ratio: 6.0,
        payback_months: 4.0,
        revenue_per_employee: 30_000_000.0,
        hr_to_revenue_ratio: 0.25,
    },
    IndustryBenchmark {
        industry: "B2C Platform",
        business_type: BusinessType::Marketplace,
        stage: Stage::Startup,
        conversion_rates: ConversionBenchmarks {
            visitor_to_buyer: Some(0.02),
            buyer_to_repeat: Some(0.25),
            ..NO_CONVERSION
        },
        monthly_churn_rate: 0.10,
        annual_churn_rate: 0.70,
        gross_margin: 0.15,
        net_margin: -0.30,
        cost_to_revenue_ratio: 1.30,
        monthly_revenue_growth: 0.25,
        customer_growth: 0.20,
        ltv: 200.0,
        cac: 150.0,
        ltv_cac_ratio: 1.3,
        payback_months: 12.0,
        revenue_per_employee: 40_000_000.0,
        hr_to_revenue_ratio: 0.50,
    },
];

pub fn all_benchmarks() -> &'static [IndustryBenchmark] {
    &BENCHMARKS
}

pub fn industry_benchmark(business_type: BusinessType, stage: Stage) -> Option<&'static IndustryBenchmark> {
    BENCHMARKS
        .iter()
        .find(|b| b.business_type == business_type && b.stage == stage)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BenchmarkStatus {
    Above,
    Below,
    Similar,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub metric: &'static str,
    pub current: f64,
    pub benchmark: f64,
    pub difference: f64,
    pub status: BenchmarkStatus,
    pub recommendation: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport {
    pub benchmark: Option<IndustryBenchmark>,
    pub comparisons: Vec<BenchmarkComparison>,
    /// 0..=100; above counts 100, similar 50, below 0.
    pub overall_score: u32,
    pub strengths: Vec<&'static str>,
    pub improvements: Vec<&'static str>,
}

struct Check {
    metric: &'static str,
    threshold: f64,
    lower_is_better: bool,
    advice: [&'static str; 3],
    strength: &'static str,
    improvement: &'static str,
}

const CONVERSION: Check = Check {
    metric: "Visitor conversion rate",
    threshold: 0.01,
    lower_is_better: false,
    advice: [
        "Conversion is ahead of the industry.",
        "Optimize landing pages and onboarding to lift conversion.",
        "In line with the industry average.",
    ],
    strength: "High conversion",
    improvement: "Improve conversion",
};

const REPEAT: Check = Check {
    metric: "Repeat purchase rate",
    threshold: 0.01,
    lower_is_better: false,
    advice: [
        "Buyers come back more often than the industry average.",
        "Use loyalty offers and follow-up campaigns to bring buyers back.",
        "In line with the industry average.",
    ],
    strength: "Loyal buyers",
    improvement: "Improve repeat purchases",
};

const CHURN: Check = Check {
    metric: "Monthly churn rate",
    threshold: 0.01,
    lower_is_better: true,
    advice: [
        "Retention is ahead of the industry.",
        "Invest in retention to bring churn down.",
        "In line with the industry average.",
    ],
    strength: "Low churn",
    improvement: "Improve retention",
};

const NET_MARGIN: Check = Check {
    metric: "Net margin",
    threshold: 0.05,
    lower_is_better: false,
    advice: [
        "Profitability is ahead of the industry.",
        "Review pricing or trim costs to improve profitability.",
        "In line with the industry average.",
    ],
    strength: "Strong profitability",
    improvement: "Improve profitability",
};

const LTV_CAC: Check = Check {
    metric: "LTV/CAC ratio",
    threshold: 0.5,
    lower_is_better: false,
    advice: [
        "Unit economics are ahead of the industry.",
        "Raise lifetime value or lower acquisition cost.",
        "In line with the industry average.",
    ],
    strength: "Strong unit economics",
    improvement: "Improve unit economics",
};

impl Check {
    fn status(&self, difference: f64) -> BenchmarkStatus {
        let better = if self.lower_is_better {
            difference < 0.0
        } else {
            difference > 0.0
        };
        if difference.abs() < self.threshold {
            BenchmarkStatus::Similar
        } else if better {
            BenchmarkStatus::Above
        } else {
            BenchmarkStatus::Below
        }
    }

    fn apply(&self, current: f64, benchmark: f64, report: &mut BenchmarkReport) {
        let difference = current - benchmark;
        let status = self.status(difference);
        let recommendation = match status {
            BenchmarkStatus::Above => {
                report.strengths.push(self.strength);
                self.advice[0]
            }
            BenchmarkStatus::Below => {
                report.improvements.push(self.improvement);
                self.advice[1]
            }
            BenchmarkStatus::Similar => self.advice[2],
        };
        report.comparisons.push(BenchmarkComparison {
            metric: self.metric,
            current,
            benchmark,
            difference,
            status,
            recommendation,
        });
    }
}

fn overall_score(comparisons: &[BenchmarkComparison]) -> u32 {
    if comparisons.is_empty() {
        return 0;
    }
    let points: f64 = comparisons
        .iter()
        .map(|c| match c.status {
            BenchmarkStatus::Above => 100.0,
            BenchmarkStatus::Similar => 50.0,
            BenchmarkStatus::Below => 0.0,
        })
        .sum();
    (points / comparisons.len() as f64).round() as u32
}

/// Scores the run against the benchmark for its business type and stage.
///
/// Marketplaces add their repeat purchase rate and use their refund rate as
/// the churn figure; unit-economics runs have no churn input and skip that
/// comparison. Hybrids have no benchmark.
pub fn compare_with_benchmarks(
    request: &SimulationRequest,
    result: &SimulationResult,
    stage: Stage,
) -> BenchmarkReport {
    let Some(benchmark) = industry_benchmark(request.business_type, stage) else {
        return BenchmarkReport::default();
    };
    let mut report = BenchmarkReport {
        benchmark: Some(*benchmark),
        ..BenchmarkReport::default()
    };

    let (conversion, churn) = match request.business_type {
        BusinessType::Subscription => (
            request
                .subscription
                .as_ref()
                .zip(benchmark.conversion_rates.visitor_to_signup)
                .map(|(sub, bench)| (sub.visitor_to_signup_rate, bench)),
            request
                .subscription
                .as_ref()
                .map(|sub| sub.monthly_churn_rate),
        ),
        BusinessType::Marketplace => (
            request
                .marketplace
                .as_ref()
                .zip(benchmark.conversion_rates.visitor_to_buyer)
                .map(|(market, bench)| (market.visitor_to_buyer_rate, bench)),
            request.marketplace.as_ref().map(|market| market.refund_rate),
        ),
        BusinessType::UnitEconomics | BusinessType::Hybrid => (None, None),
    };

    if let Some((current, bench)) = conversion {
        CONVERSION.apply(current, bench, &mut report);
    }
    let repeat = match request.business_type {
        BusinessType::Marketplace => request
            .marketplace
            .as_ref()
            .zip(benchmark.conversion_rates.buyer_to_repeat),
        _ => None,
    };
    if let Some((market, bench)) = repeat {
        REPEAT.apply(market.buyer_to_repeat_rate, bench, &mut report);
    }
    if let Some(current) = churn {
        CHURN.apply(current, benchmark.monthly_churn_rate, &mut report);
    }
    NET_MARGIN.apply(
        result.summary.average_profit_margin,
        benchmark.net_margin,
        &mut report,
    );
    let cac = result.summary.cac();
    if let Metric::Finite(ltv) = result.summary.ltv() {
        if cac > 0.0 {
            LTV_CAC.apply(ltv / cac, benchmark.ltv_cac_ratio, &mut report);
        }
    }

    report.overall_score = overall_score(&report.comparisons);
    report
}

use serde::Serialize;

use super::types::{CustomFunnel, FunnelStep};

/// Steps of the selected funnel in `order`, or `None` when no usable funnel is active.
///
/// A funnel is usable when its id matches, it is flagged active and it has
/// at least one step. Ties in `order` keep their declared sequence.
pub fn active_steps<'a>(
    funnels: &'a [CustomFunnel],
    active_funnel_id: Option<&str>,
) -> Option<Vec<&'a FunnelStep>> {
    let id = active_funnel_id?;
    let funnel = funnels.iter().find(|f| f.id == id)?;
    if !funnel.is_active || funnel.steps.is_empty() {
        return None;
    }
    let mut steps: Vec<&FunnelStep> = funnel.steps.iter().collect();
    steps.sort_by_key(|step| step.order);
    Some(steps)
}

/// Compounded step rate; `1.0` when no funnel applies.
pub fn conversion_rate(funnels: &[CustomFunnel], active_funnel_id: Option<&str>) -> f64 {
    active_steps(funnels, active_funnel_id)
        .map(|steps| steps.iter().map(|s| s.conversion_rate).product())
        .unwrap_or(1.0)
}

/// Converts `base_volume` through the active funnel, falling back to a flat rate.
pub fn convert(
    base_volume: f64,
    funnels: &[CustomFunnel],
    active_funnel_id: Option<&str>,
    fallback_rate: f64,
) -> f64 {
    match active_steps(funnels, active_funnel_id) {
        Some(steps) => steps
            .iter()
            .fold(base_volume, |value, step| value * step.conversion_rate),
        None => base_volume * fallback_rate,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStepValue {
    pub step: FunnelStep,
    pub value: f64,
    pub cumulative_rate: f64,
}

pub fn funnel_step_values(
    base_volume: f64,
    funnels: &[CustomFunnel],
    active_funnel_id: Option<&str>,
) -> Vec<FunnelStepValue> {
    let Some(steps) = active_steps(funnels, active_funnel_id) else {
        return Vec::new();
    };
    let mut value = base_volume;
    let mut cumulative_rate = 1.0;
    steps
        .into_iter()
        .map(|step| {
            value *= step.conversion_rate;
            cumulative_rate *= step.conversion_rate;
            FunnelStepValue {
                step: step.clone(),
                value,
                cumulative_rate,
            }
        })
        .collect()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunnelGrade {
    Excellent,
    Good,
    Average,
    Poor,
}

impl FunnelGrade {
    pub fn for_rate(total_conversion_rate: f64) -> Self {
        if total_conversion_rate >= 0.1 {
            FunnelGrade::Excellent
        } else if total_conversion_rate >= 0.05 {
            FunnelGrade::Good
        } else if total_conversion_rate >= 0.02 {
            FunnelGrade::Average
        } else {
            FunnelGrade::Poor
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelEfficiency {
    pub total_conversion_rate: f64,
    pub step_count: usize,
    pub average_step_conversion_rate: f64,
    pub weakest_step: Option<FunnelStep>,
    pub strongest_step: Option<FunnelStep>,
    pub efficiency: FunnelGrade,
}

pub fn analyze_funnel_efficiency(
    funnels: &[CustomFunnel],
    active_funnel_id: Option<&str>,
) -> FunnelEfficiency {
    let Some(steps) = active_steps(funnels, active_funnel_id) else {
        return FunnelEfficiency {
            total_conversion_rate: 1.0,
            step_count: 0,
            average_step_conversion_rate: 1.0,
            weakest_step: None,
            strongest_step: None,
            efficiency: FunnelGrade::Excellent,
        };
    };
    let total_conversion_rate: f64 = steps.iter().map(|s| s.conversion_rate).product();
    let average_step_conversion_rate =
        steps.iter().map(|s| s.conversion_rate).sum::<f64>() / steps.len() as f64;
    // Earliest step wins ties on either end.
    let weakest_step = steps
        .iter()
        .copied()
        .reduce(|best, s| if s.conversion_rate < best.conversion_rate { s } else { best })
        .cloned();
    let strongest_step = steps
        .iter()
        .copied()
        .reduce(|best, s| if s.conversion_rate > best.conversion_rate { s } else { best })
        .cloned();

    FunnelEfficiency {
        total_conversion_rate,
        step_count: steps.len(),
        average_step_conversion_rate,
        weakest_step,
        strongest_step,
        efficiency: FunnelGrade::for_rate(total_conversion_rate),
    }
}

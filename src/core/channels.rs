use serde::Serialize;

use super::types::ChannelInfo;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelShare {
    pub name: String,
    pub percentage: f64,
    pub visitors: f64,
    pub cost: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelAllocation {
    pub channels: Vec<ChannelShare>,
    pub total_cost: f64,
    pub total_visitors: f64,
}

/// Splits `total_visitors` by channel weight and prices each share.
///
/// Weights are not normalized; rounding drift between the shares and the
/// total is left as is.
pub fn allocate(total_visitors: f64, channels: &[ChannelInfo]) -> ChannelAllocation {
    let shares: Vec<ChannelShare> = channels
        .iter()
        .map(|channel| {
            let visitors = (total_visitors * channel.percentage).round();
            let cost = (visitors * channel.cost_per_visitor.unwrap_or(0.0)).round();
            ChannelShare {
                name: channel.name.clone(),
                percentage: channel.percentage,
                visitors,
                cost,
            }
        })
        .collect();
    ChannelAllocation {
        total_cost: shares.iter().map(|s| s.cost).sum(),
        total_visitors,
        channels: shares,
    }
}

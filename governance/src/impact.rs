//! Rough environmental impact estimates derived from proposal funding.
//!
//! Only `active` and `passed` proposals count. Coefficients are per unit of
//! funding unless noted.

use econexus_types::{Proposal, ProposalStatus};
use serde::{Deserialize, Serialize};

const ENERGY_GWH_PER_UNIT: f64 = 0.000_03;
const CO2_TONNES_PER_GWH: f64 = 0.4;
const FUNDING_PER_TREE: f64 = 5.0;
const CO2_TONNES_PER_TREE: f64 = 0.048;
const WASTE_TONNES_PER_UNIT: f64 = 0.001;
const OCEAN_CO2_TONNES_PER_UNIT: f64 = 0.000_5;
const CAPTURE_CO2_TONNES_PER_UNIT: f64 = 0.000_1;
const GENERIC_CO2_TONNES_PER_UNIT: f64 = 0.000_02;
const WATER_ML_PER_UNIT: f64 = 0.000_001;
const CELSIUS_PER_CO2_TONNE: f64 = 0.000_000_1;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactMetrics {
    /// Tonnes, whole.
    #[serde(rename = "totalCO2Reduced")]
    pub total_co2_reduced: f64,
    /// GWh, two decimals.
    pub clean_energy_generated: f64,
    /// Tonnes, whole.
    pub waste_recycled: f64,
    pub trees_planted: u64,
    /// Megalitres, two decimals.
    pub water_saved: f64,
    /// Degrees Celsius, four decimals.
    pub temperature_impact: f64,
    pub total_funding_deployed: f64,
    pub projects_completed: usize,
}

impl ImpactMetrics {
    pub fn estimate(proposals: &[Proposal]) -> Self {
        let mut funding = 0.0;
        let mut co2 = 0.0;
        let mut energy = 0.0;
        let mut waste = 0.0;
        let mut trees: u64 = 0;
        let mut projects = 0;

        for p in proposals
            .iter()
            .filter(|p| matches!(p.status, ProposalStatus::Active | ProposalStatus::Passed))
        {
            projects += 1;
            let amount = p.funding_amount;
            funding += amount;
            match p.category.as_str() {
                "renewable-energy" | "clean-energy" => {
                    let gwh = amount * ENERGY_GWH_PER_UNIT;
                    energy += gwh;
                    co2 += gwh * CO2_TONNES_PER_GWH;
                }
                "reforestation" => {
                    let planted = (amount / FUNDING_PER_TREE).floor() as u64;
                    trees += planted;
                    co2 += planted as f64 * CO2_TONNES_PER_TREE;
                }
                "ocean-cleanup" => {
                    waste += amount * WASTE_TONNES_PER_UNIT;
                    co2 += amount * OCEAN_CO2_TONNES_PER_UNIT;
                }
                "carbon-capture" => co2 += amount * CAPTURE_CO2_TONNES_PER_UNIT,
                _ => co2 += amount * GENERIC_CO2_TONNES_PER_UNIT,
            }
        }

        Self {
            total_co2_reduced: round_to(co2, 0),
            clean_energy_generated: round_to(energy, 2),
            waste_recycled: round_to(waste, 0),
            trees_planted: trees,
            water_saved: round_to(funding * WATER_ML_PER_UNIT, 2),
            temperature_impact: round_to(co2 * CELSIUS_PER_CO2_TONNE, 4),
            total_funding_deployed: round_to(funding, 0),
            projects_completed: projects,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

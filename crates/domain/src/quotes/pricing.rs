//! Quote cost calculator.
//!
//! Pure function of the request, the staff-entered cost inputs and the
//! configured rates. Every component must be a finite, non-negative amount.

use serde::{Deserialize, Serialize};

use crate::{config::PricingConfig, errors::Error, validation::Violations};

use super::model::{AdditionalCost, QuoteRequest};

/// How the hospital bills the operating room.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FacilityRate {
    Flat { amount: f64 },
    /// Charged per hour of surgery
    Hourly { rate: f64 },
}

impl Default for FacilityRate {
    fn default() -> Self {
        Self::Flat { amount: 0.0 }
    }
}

impl FacilityRate {
    pub fn cost(&self, duration_hours: f64) -> f64 {
        match self {
            FacilityRate::Flat { amount } => *amount,
            FacilityRate::Hourly { rate } => rate * duration_hours,
        }
    }
}

/// What staff enter on the response form.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostInputs {
    /// Replaces the sum of the material lines when set
    #[serde(default)]
    pub materials_cost: Option<f64>,
    pub hospital_facility: FacilityRate,
    /// Only charged when the hospital provides the anesthesiologist
    #[serde(default)]
    pub anesthesia_cost: f64,
    #[serde(default)]
    pub blood_bag_unit_rate: Option<f64>,
    #[serde(default)]
    pub additional_costs: Vec<AdditionalCost>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub materials_cost: f64,
    pub medical_team_cost: f64,
    pub hospital_facility_cost: f64,
    pub anesthesia_cost: f64,
    pub blood_bank_cost: f64,
    pub additional_costs: Vec<AdditionalCost>,
    pub total_estimated_cost: f64,
}

pub fn calculate(
    request: &QuoteRequest,
    inputs: &CostInputs,
    config: &PricingConfig,
) -> Result<CostBreakdown, Error> {
    let materials_cost = inputs
        .materials_cost
        .unwrap_or_else(|| request.materials.iter().map(|m| m.total_price).sum());
    let medical_team_cost = request.medical_team.iter().map(|t| t.fee).sum();
    let hospital_facility_cost = inputs.hospital_facility.cost(request.duration_hours);
    let anesthesia_cost = if request.hospital_anesthesiologist {
        inputs.anesthesia_cost
    } else {
        0.0
    };
    let blood_bag_unit_rate = inputs
        .blood_bag_unit_rate
        .unwrap_or(config.blood_bag_unit_rate);
    let blood_bank_cost = f64::from(request.blood_bags_needed) * blood_bag_unit_rate;

    let mut violations = Violations::default();
    for (field, amount) in [
        ("materialsCost", materials_cost),
        ("medicalTeamCost", medical_team_cost),
        ("hospitalFacilityCost", hospital_facility_cost),
        ("anesthesiaCost", anesthesia_cost),
        ("bloodBagUnitRate", blood_bag_unit_rate),
        ("bloodBankCost", blood_bank_cost),
    ] {
        check_amount(&mut violations, field.to_string(), amount);
    }
    for (i, cost) in inputs.additional_costs.iter().enumerate() {
        if cost.description.trim().is_empty() {
            violations.push(format!("additionalCosts[{}].description", i), "required");
        }
        check_amount(&mut violations, format!("additionalCosts[{}].amount", i), cost.amount);
    }
    violations.into_result()?;

    let total_estimated_cost = materials_cost
        + medical_team_cost
        + hospital_facility_cost
        + anesthesia_cost
        + blood_bank_cost
        + inputs.additional_costs.iter().map(|c| c.amount).sum::<f64>();

    // Finite parts can still overflow, and JSON has no infinity.
    let mut violations = Violations::default();
    check_amount(&mut violations, "totalEstimatedCost".to_string(), total_estimated_cost);
    violations.into_result()?;

    Ok(CostBreakdown {
        materials_cost,
        medical_team_cost,
        hospital_facility_cost,
        anesthesia_cost,
        blood_bank_cost,
        additional_costs: inputs.additional_costs.clone(),
        total_estimated_cost,
    })
}

fn check_amount(violations: &mut Violations, field: String, amount: f64) {
    if !amount.is_finite() {
        violations.push(field, "must be a finite number");
    } else if amount < 0.0 {
        violations.push(field, "must not be negative");
    }
}

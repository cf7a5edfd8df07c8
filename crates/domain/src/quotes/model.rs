use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::{QuoteStatus, ReportStatus};

/// Tolerance for comparing money amounts.
pub const MONEY_EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Default for Gender {
    fn default() -> Self {
        Self::Other
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuardianInfo {
    pub name: String,
    pub relationship: String,
    pub contact_number: String,
    pub email: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    /// Patient portal user id, when the patient has an account.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub is_minor: bool,
    #[serde(default)]
    pub guardian_info: Option<GuardianInfo>,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub comorbidities: BTreeSet<String>,
    #[serde(default)]
    pub allergies: BTreeSet<String>,
}

pub const AGE_OF_MAJORITY: u32 = 18;

impl PatientInfo {
    pub fn is_under_age(&self) -> bool {
        self.age < AGE_OF_MAJORITY
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteMaterial {
    pub material_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    pub supplier_id: String,
    pub supplier_name: String,
    pub hospital_registered: bool,
}

impl QuoteMaterial {
    /// Material line with `total_price` derived from quantity and unit price.
    pub fn new(
        material_id: impl Into<String>,
        name: impl Into<String>,
        quantity: u32,
        unit_price: f64,
        supplier_id: impl Into<String>,
        supplier_name: impl Into<String>,
        hospital_registered: bool,
    ) -> Self {
        Self {
            material_id: material_id.into(),
            name: name.into(),
            quantity,
            unit_price,
            total_price: f64::from(quantity) * unit_price,
            supplier_id: supplier_id.into(),
            supplier_name: supplier_name.into(),
            hospital_registered,
        }
    }

    pub fn expected_total(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTeamMember {
    pub member_id: String,
    pub name: String,
    pub role: String,
    pub fee: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub id: String,
    pub patient_info: PatientInfo,
    pub procedure_id: String,
    pub procedure_name: String,
    pub materials: Vec<QuoteMaterial>,
    pub medical_team: Vec<QuoteTeamMember>,
    pub hospital_anesthesiologist: bool,
    pub duration_hours: f64,
    pub blood_bags_needed: u32,
    pub comorbidities: BTreeSet<String>,
    pub additional_notes: String,
    pub request_date: DateTime<Utc>,
    pub status: QuoteStatus,
    pub doctor_id: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalCost {
    pub description: String,
    pub amount: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub id: String,
    pub quote_request_id: String,
    pub materials_cost: f64,
    pub medical_team_cost: f64,
    pub hospital_facility_cost: f64,
    pub anesthesia_cost: f64,
    pub blood_bank_cost: f64,
    pub additional_costs: Vec<AdditionalCost>,
    pub total_estimated_cost: f64,
    pub valid_until: DateTime<Utc>,
    pub notes: String,
    pub responded_by: String,
    pub responded_date: DateTime<Utc>,
}

impl QuoteResponse {
    pub fn component_sum(&self) -> f64 {
        self.materials_cost
            + self.medical_team_cost
            + self.hospital_facility_cost
            + self.anesthesia_cost
            + self.blood_bank_cost
            + self.additional_costs.iter().map(|c| c.amount).sum::<f64>()
    }

    pub fn is_balanced(&self) -> bool {
        (self.component_sum() - self.total_estimated_cost).abs() <= MONEY_EPSILON
    }
}

/// Read-only pairing of a request with its response.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteReport {
    pub id: String,
    pub quote_request: QuoteRequest,
    pub quote_response: QuoteResponse,
    pub generated_date: DateTime<Utc>,
    pub generated_by: String,
    pub status: ReportStatus,
}

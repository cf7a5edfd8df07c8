use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{model::PatientInfo, pricing::CostInputs};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSelection {
    pub material_id: String,
    pub quantity: u32,
    pub supplier_id: String,
    #[serde(default)]
    pub hospital_registered: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamSelection {
    pub member_id: String,
    pub fee: f64,
}

/// New quote request form.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewQuoteInput {
    pub patient_info: PatientInfo,
    pub procedure_id: String,
    #[serde(default)]
    pub materials: Vec<MaterialSelection>,
    #[serde(default)]
    pub medical_team: Vec<TeamSelection>,
    #[serde(default)]
    pub hospital_anesthesiologist: bool,
    pub duration_hours: f64,
    #[serde(default)]
    pub blood_bags_needed: u32,
    #[serde(default)]
    pub comorbidities: BTreeSet<String>,
    #[serde(default)]
    pub additional_notes: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponseInput {
    pub costs: CostInputs,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RejectQuoteInput {
    #[serde(default)]
    pub reason: String,
}

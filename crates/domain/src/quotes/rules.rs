//! Validation schemas for quote submissions.

use crate::validation::{Schema, Violations, REQUIRED};

use super::model::{
    GuardianInfo, PatientInfo, QuoteMaterial, QuoteRequest, QuoteTeamMember, AGE_OF_MAJORITY,
    MONEY_EPSILON,
};

/// Surgeries shorter than half an hour are not quoted.
pub const MIN_DURATION_HOURS: f64 = 0.5;

pub fn guardian_schema() -> Schema<GuardianInfo> {
    Schema::<GuardianInfo>::new()
        .required("name", |g| &g.name)
        .required("relationship", |g| &g.relationship)
        .required("contactNumber", |g| &g.contact_number)
        .email("email", |g| &g.email)
}

pub fn patient_schema() -> Schema<PatientInfo> {
    let guardian = guardian_schema();

    Schema::<PatientInfo>::new()
        .required("name", |p| &p.name)
        .required("contactNumber", |p| &p.contact_number)
        .email("email", |p| &p.email)
        .required("address", |p| &p.address)
        .rule("isMinor", |p| match (p.is_under_age(), p.is_minor) {
            (true, false) => Some(format!(
                "must be true for patients under {}",
                AGE_OF_MAJORITY
            )),
            (false, true) => Some(format!(
                "must be false for patients aged {} or older",
                AGE_OF_MAJORITY
            )),
            _ => None,
        })
        .check(move |p, violations| {
            if !(p.is_under_age() || p.is_minor) {
                return;
            }
            match &p.guardian_info {
                Some(info) => violations.extend_nested("guardianInfo", guardian.evaluate(info)),
                None => {
                    for field in ["name", "relationship", "contactNumber", "email"] {
                        violations.push(format!("guardianInfo.{}", field), REQUIRED);
                    }
                }
            }
        })
}

pub fn material_schema() -> Schema<QuoteMaterial> {
    Schema::<QuoteMaterial>::new()
        .required("materialId", |m| &m.material_id)
        .required("name", |m| &m.name)
        .min("quantity", 1.0, |m| f64::from(m.quantity))
        .non_negative("unitPrice", |m| m.unit_price)
        .rule("totalPrice", |m| {
            ((m.total_price - m.expected_total()).abs() > MONEY_EPSILON)
                .then(|| "must equal quantity × unitPrice".to_string())
        })
}

pub fn team_member_schema() -> Schema<QuoteTeamMember> {
    Schema::<QuoteTeamMember>::new()
        .required("memberId", |t| &t.member_id)
        .non_negative("fee", |t| t.fee)
}

pub fn request_schema() -> Schema<QuoteRequest> {
    Schema::<QuoteRequest>::new()
        .required("id", |r| &r.id)
        .nested("patientInfo", patient_schema(), |r| &r.patient_info)
        .required("procedureId", |r| &r.procedure_id)
        .each("materials", material_schema(), |r| &r.materials)
        .each("medicalTeam", team_member_schema(), |r| &r.medical_team)
        .min("durationHours", MIN_DURATION_HOURS, |r| r.duration_hours)
        .required("doctorId", |r| &r.doctor_id)
}

/// Minor-patient guardian rule plus the patient form fields.
pub fn validate_patient(patient: &PatientInfo) -> Violations {
    patient_schema().evaluate(patient)
}

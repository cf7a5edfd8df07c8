//! Builds a [`QuoteRequest`] from the new-quote form.
//!
//! Selections are looked up in the catalog so names, prices and supplier
//! names come from the registries rather than from the caller.

use chrono::{DateTime, Utc};

use crate::{
    catalog::{Catalog, MedicalTeamMember, SurgicalMaterial, SurgicalProcedure, Supplier},
    errors::Error,
    validation::Violations,
};

use super::{
    inputs::NewQuoteInput,
    model::{QuoteMaterial, QuoteRequest, QuoteTeamMember},
    rules,
    status::QuoteStatus,
};

const UNKNOWN: &str = "not found in catalog";

pub async fn build_request(
    catalog: &Catalog,
    id: String,
    doctor_id: String,
    input: NewQuoteInput,
    now: DateTime<Utc>,
) -> Result<QuoteRequest, Error> {
    let mut violations = Violations::default();

    let procedure_name = if input.procedure_id.trim().is_empty() {
        String::new()
    } else {
        match catalog.find::<SurgicalProcedure>(&input.procedure_id).await? {
            Some(procedure) => procedure.name,
            None => {
                violations.push("procedureId", UNKNOWN);
                String::new()
            }
        }
    };

    let mut materials = Vec::with_capacity(input.materials.len());
    for (i, selection) in input.materials.iter().enumerate() {
        let Some(material) = catalog.find::<SurgicalMaterial>(&selection.material_id).await? else {
            violations.push(format!("materials[{}].materialId", i), UNKNOWN);
            continue;
        };
        if !material.is_supplied_by(&selection.supplier_id) {
            violations.push(
                format!("materials[{}].supplierId", i),
                format!("does not supply {}", material.name),
            );
            continue;
        }
        let Some(supplier) = catalog.find::<Supplier>(&selection.supplier_id).await? else {
            violations.push(format!("materials[{}].supplierId", i), UNKNOWN);
            continue;
        };

        materials.push(QuoteMaterial::new(
            material.id,
            material.name,
            selection.quantity,
            material.unit_price,
            supplier.id,
            supplier.name,
            selection.hospital_registered,
        ));
    }

    let mut medical_team = Vec::with_capacity(input.medical_team.len());
    for (i, selection) in input.medical_team.iter().enumerate() {
        match catalog.find::<MedicalTeamMember>(&selection.member_id).await? {
            Some(member) => medical_team.push(QuoteTeamMember {
                member_id: member.id,
                name: member.name,
                role: member.role.as_str().to_string(),
                fee: selection.fee,
            }),
            None => violations.push(format!("medicalTeam[{}].memberId", i), UNKNOWN),
        }
    }

    violations.into_result()?;

    let mut patient_info = input.patient_info;
    if !(patient_info.is_under_age() || patient_info.is_minor) {
        patient_info.guardian_info = None;
    }
    let mut comorbidities = input.comorbidities;
    comorbidities.extend(patient_info.comorbidities.iter().cloned());
    patient_info.comorbidities = comorbidities.clone();

    let request = QuoteRequest {
        id,
        patient_info,
        procedure_id: input.procedure_id,
        procedure_name,
        materials,
        medical_team,
        hospital_anesthesiologist: input.hospital_anesthesiologist,
        duration_hours: input.duration_hours,
        blood_bags_needed: input.blood_bags_needed,
        comorbidities,
        additional_notes: input.additional_notes,
        request_date: now,
        status: QuoteStatus::Pending,
        doctor_id,
    };

    rules::request_schema().validate(&request)?;
    Ok(request)
}

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::Schema;

use super::{Catalog, Entity, SharedRepository};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Doctor,
    Secretary,
    Anesthesiologist,
    Nurse,
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Secretary => "secretary",
            Self::Anesthesiologist => "anesthesiologist",
            Self::Nurse => "nurse",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicalTeamMember {
    pub id: String,
    pub name: String,
    pub role: TeamRole,
    pub specialization: String,
    pub email: String,
    pub phone: String,
    pub license: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalTeamMemberInput {
    pub name: String,
    pub role: TeamRole,
    pub specialization: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub license: Option<String>,
}

impl Entity for MedicalTeamMember {
    const KIND: &'static str = "MedicalTeamMember";
    type Input = MedicalTeamMemberInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_input(id: String, created_at: DateTime<Utc>, input: Self::Input) -> Self {
        Self {
            id,
            name: input.name,
            role: input.role,
            specialization: input.specialization,
            email: input.email,
            phone: input.phone,
            license: input.license.filter(|l| !l.trim().is_empty()),
            created_at,
        }
    }

    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .required("name", |m| &m.name)
            .required("specialization", |m| &m.specialization)
            .email("email", |m| &m.email)
            .required("phone", |m| &m.phone)
    }

    fn repository(catalog: &Catalog) -> &SharedRepository<Self> {
        &catalog.team_members
    }
}

/// OPME item: surgical materials, orthotics and prosthetics.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurgicalMaterial {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub supplier_ids: Vec<String>,
    pub unit_price: f64,
    pub stock_quantity: u32,
    pub required_approval: bool,
    pub created_at: DateTime<Utc>,
}

impl SurgicalMaterial {
    pub fn is_supplied_by(&self, supplier_id: &str) -> bool {
        self.supplier_ids.iter().any(|id| id == supplier_id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurgicalMaterialInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub supplier_ids: Vec<String>,
    pub unit_price: f64,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub required_approval: bool,
}

impl Entity for SurgicalMaterial {
    const KIND: &'static str = "SurgicalMaterial";
    type Input = SurgicalMaterialInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_input(id: String, created_at: DateTime<Utc>, input: Self::Input) -> Self {
        let mut seen = BTreeSet::new();
        let mut supplier_ids = input.supplier_ids;
        supplier_ids.retain(|s| !s.trim().is_empty() && seen.insert(s.clone()));

        Self {
            id,
            name: input.name,
            description: input.description,
            category: input.category,
            supplier_ids,
            unit_price: input.unit_price,
            stock_quantity: input.stock_quantity,
            required_approval: input.required_approval,
            created_at,
        }
    }

    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .required("name", |m| &m.name)
            .required("category", |m| &m.category)
            .rule("supplierIds", |m| {
                m.supplier_ids
                    .is_empty()
                    .then(|| "at least one supplier is required".to_string())
            })
            .non_negative("unitPrice", |m| m.unit_price)
    }

    fn repository(catalog: &Catalog) -> &SharedRepository<Self> {
        &catalog.materials
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurgicalProcedure {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub duration_minutes: u32,
    pub recommended_materials: Vec<String>,
    pub complexity: Complexity,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurgicalProcedureInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub duration_minutes: u32,
    #[serde(default)]
    pub recommended_materials: Vec<String>,
    pub complexity: Complexity,
}

impl Entity for SurgicalProcedure {
    const KIND: &'static str = "SurgicalProcedure";
    type Input = SurgicalProcedureInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_input(id: String, created_at: DateTime<Utc>, input: Self::Input) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            category: input.category,
            duration_minutes: input.duration_minutes,
            recommended_materials: input.recommended_materials,
            complexity: input.complexity,
            created_at,
        }
    }

    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .required("name", |p| &p.name)
            .required("category", |p| &p.category)
            .min("durationMinutes", 1.0, |p| f64::from(p.duration_minutes))
    }

    fn repository(catalog: &Catalog) -> &SharedRepository<Self> {
        &catalog.procedures
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub materials: Vec<String>,
    pub preferred_payment_terms: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierInput {
    pub name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub preferred_payment_terms: String,
}

impl Entity for Supplier {
    const KIND: &'static str = "Supplier";
    type Input = SupplierInput;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_input(id: String, created_at: DateTime<Utc>, input: Self::Input) -> Self {
        Self {
            id,
            name: input.name,
            contact_name: input.contact_name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            materials: input.materials,
            preferred_payment_terms: input.preferred_payment_terms,
            created_at,
        }
    }

    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .required("name", |s| &s.name)
            .required("contactName", |s| &s.contact_name)
            .email("email", |s| &s.email)
            .required("phone", |s| &s.phone)
            .required("address", |s| &s.address)
    }

    fn repository(catalog: &Catalog) -> &SharedRepository<Self> {
        &catalog.suppliers
    }
}

//! Quote counters and quote lists for the medical and patient dashboards.

/// DynamoDB counters table
pub mod store;

/// Per-owner quote lists
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::{
    catalog::{Catalog, MedicalTeamMember, SurgicalMaterial, SurgicalProcedure, Supplier},
    errors::Error,
    quotes::{QuoteRequest, QuoteStatus, StatusChange},
};

pub use store::DashboardStore;
pub use summary::{QuoteSummary, SummaryStore};

/// Whose counters an update touches.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum DashboardKey {
    Doctor(String),
    Patient(String),
}

impl DashboardKey {
    pub fn as_key(&self) -> String {
        match self {
            DashboardKey::Doctor(id) => format!("doctor#{}", id),
            DashboardKey::Patient(id) => format!("patient#{}", id),
        }
    }

    /// Counters a quote contributes to: its doctor's and, when the patient
    /// is registered, the patient's.
    pub fn for_request(request: &QuoteRequest) -> Vec<DashboardKey> {
        let mut keys = vec![DashboardKey::Doctor(request.doctor_id.clone())];
        if let Some(patient_id) = request.patient_info.id.as_ref().filter(|id| !id.is_empty()) {
            keys.push(DashboardKey::Patient(patient_id.clone()));
        }
        keys
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteCounters {
    pub total: i64,
    pub pending: i64,
    pub estimated: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl QuoteCounters {
    pub fn get_mut(&mut self, status: QuoteStatus) -> &mut i64 {
        match status {
            QuoteStatus::Pending => &mut self.pending,
            QuoteStatus::Estimated => &mut self.estimated,
            QuoteStatus::Approved => &mut self.approved,
            QuoteStatus::Rejected => &mut self.rejected,
        }
    }

    /// In-memory equivalent of the store's atomic update.
    pub fn apply(&mut self, change: StatusChange) {
        match change.from {
            Some(from) => *self.get_mut(from) -= 1,
            None => self.total += 1,
        }
        *self.get_mut(change.to) += 1;
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicalDashboard {
    pub quotes: QuoteCounters,
    pub team_members: usize,
    pub materials: usize,
    pub low_stock_materials: usize,
    pub procedures: usize,
    pub suppliers: usize,
}

impl MedicalDashboard {
    pub async fn build(
        quotes: QuoteCounters,
        catalog: &Catalog,
        low_stock_threshold: u32,
    ) -> Result<Self, Error> {
        let materials = catalog.list::<SurgicalMaterial>().await?;
        let low_stock_materials = materials
            .iter()
            .filter(|m| m.stock_quantity < low_stock_threshold)
            .count();

        Ok(Self {
            quotes,
            team_members: catalog.list::<MedicalTeamMember>().await?.len(),
            materials: materials.len(),
            low_stock_materials,
            procedures: catalog.list::<SurgicalProcedure>().await?.len(),
            suppliers: catalog.list::<Supplier>().await?.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn counters_follow_a_quote_through_its_life() {
        let mut counters = QuoteCounters::default();
        for status in [QuoteStatus::Pending, QuoteStatus::Pending] {
            counters.apply(StatusChange { from: None, to: status });
        }
        counters.apply(StatusChange {
            from: Some(QuoteStatus::Pending),
            to: QuoteStatus::Estimated,
        });
        counters.apply(StatusChange {
            from: Some(QuoteStatus::Estimated),
            to: QuoteStatus::Approved,
        });

        assert_eq!(
            counters,
            QuoteCounters {
                total: 2,
                pending: 1,
                estimated: 0,
                approved: 1,
                rejected: 0,
            }
        );
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(DashboardKey::Doctor("1".into()).as_key(), "doctor#1");
        assert_eq!(DashboardKey::Patient("p1".into()).as_key(), "patient#p1");
    }

    #[test]
    fn anonymous_patients_only_count_for_the_doctor() {
        let mut request = QuoteRequest {
            doctor_id: "doc1".into(),
            ..Default::default()
        };
        assert_eq!(
            DashboardKey::for_request(&request),
            vec![DashboardKey::Doctor("doc1".into())]
        );

        request.patient_info.id = Some("p1".into());
        assert_eq!(
            DashboardKey::for_request(&request),
            vec![
                DashboardKey::Doctor("doc1".into()),
                DashboardKey::Patient("p1".into())
            ]
        );
    }

    #[tokio::test]
    async fn medical_dashboard_counts_low_stock() {
        let catalog = Catalog::in_memory();
        for (id, stock) in [("1", 15), ("2", 4)] {
            let material = SurgicalMaterial {
                id: id.into(),
                name: format!("Material {}", id),
                description: String::new(),
                category: "General Surgery".into(),
                supplier_ids: vec!["1".into()],
                unit_price: 10.0,
                stock_quantity: stock,
                required_approval: false,
                created_at: Utc::now(),
            };
            catalog.materials.create(material).await.unwrap();
        }

        let dashboard = MedicalDashboard::build(QuoteCounters::default(), &catalog, 10)
            .await
            .unwrap();
        assert_eq!(dashboard.materials, 2);
        assert_eq!(dashboard.low_stock_materials, 1);
        assert_eq!(dashboard.team_members, 0);
    }
}

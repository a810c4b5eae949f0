use carebid_catalog::{CatalogError, ProviderCategory};
use carebid_offer::{OfferError, ScoringError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clinical order categories handled by the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCategory {
    Medication,
    LabTest,
}

impl OrderCategory {
    /// The provider network that serves this category
    pub fn provider_category(&self) -> ProviderCategory {
        match self {
            OrderCategory::Medication => ProviderCategory::Pharmacy,
            OrderCategory::LabTest => ProviderCategory::Lab,
        }
    }
}

/// One prescribed medication line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationItem {
    pub name: String,
    pub dosage: String,
    pub instructions: String,
}

/// One ordered lab test line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestItem {
    pub name: String,
    pub reason: String,
}

/// The item list of a clinical order, shaped by its category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderItems {
    Medications(Vec<MedicationItem>),
    Tests(Vec<TestItem>),
}

impl OrderItems {
    pub fn len(&self) -> usize {
        match self {
            OrderItems::Medications(items) => items.len(),
            OrderItems::Tests(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn category(&self) -> OrderCategory {
        match self {
            OrderItems::Medications(_) => OrderCategory::Medication,
            OrderItems::Tests(_) => OrderCategory::LabTest,
        }
    }
}

/// Display-only context about who requested the order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicianContext {
    pub clinician_name: String,
    pub patient_name: String,
}

/// A clinical request being fulfilled. Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub category: OrderCategory,
    pub items: OrderItems,
    pub clinician: ClinicianContext,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build an order, rejecting an item list that disagrees with the
    /// category.
    pub fn new(
        category: OrderCategory,
        items: OrderItems,
        clinician: ClinicianContext,
    ) -> Result<Self, OrderError> {
        if items.category() != category {
            return Err(OrderError::CategoryMismatch {
                category: format!("{category:?}"),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            category,
            items,
            clinician,
            created_at: Utc::now(),
        })
    }

    /// A medication order; the category is implied by the items.
    pub fn medication(items: Vec<MedicationItem>, clinician: ClinicianContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: OrderCategory::Medication,
            items: OrderItems::Medications(items),
            clinician,
            created_at: Utc::now(),
        }
    }

    /// A lab test order; the category is implied by the items.
    pub fn lab(items: Vec<TestItem>, clinician: ClinicianContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: OrderCategory::LabTest,
            items: OrderItems::Tests(items),
            clinician,
            created_at: Utc::now(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.items.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order items do not match category {category}")]
    CategoryMismatch { category: String },

    #[error("Catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Offer bookkeeping failed: {0}")]
    OfferBook(#[from] OfferError),

    #[error("Scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}

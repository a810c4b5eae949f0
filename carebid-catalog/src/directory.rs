use crate::provider::{Provider, ProviderCategory, QualityGrade, ServiceMode};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// Source of provider reference data. The engine only sees this trait, so
/// the in-memory directory can be swapped for a remote network directory.
#[async_trait]
pub trait ProviderSource: Send + Sync {
    /// All providers able to serve the given category. An empty list is a
    /// valid answer, not an error.
    async fn providers_for(&self, category: ProviderCategory)
        -> Result<Vec<Provider>, CatalogError>;

    /// Lookup a single provider by id.
    async fn get(&self, provider_id: &Uuid) -> Result<Option<Provider>, CatalogError>;
}

/// In-memory provider directory
pub struct ProviderDirectory {
    providers: HashMap<ProviderCategory, Vec<Provider>>,
}

impl ProviderDirectory {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Directory pre-seeded with the demo pharmacy and lab networks.
    pub fn with_demo_catalog() -> Self {
        let mut directory = Self::new();
        for provider in demo_pharmacies() {
            directory.add(provider);
        }
        for provider in demo_labs() {
            directory.add(provider);
        }
        directory
    }

    pub fn add(&mut self, provider: Provider) {
        self.providers
            .entry(provider.category)
            .or_default()
            .push(provider);
    }

    pub fn count(&self, category: ProviderCategory) -> usize {
        self.providers.get(&category).map_or(0, Vec::len)
    }
}

impl Default for ProviderDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderSource for ProviderDirectory {
    async fn providers_for(
        &self,
        category: ProviderCategory,
    ) -> Result<Vec<Provider>, CatalogError> {
        Ok(self.providers.get(&category).cloned().unwrap_or_default())
    }

    async fn get(&self, provider_id: &Uuid) -> Result<Option<Provider>, CatalogError> {
        Ok(self
            .providers
            .values()
            .flatten()
            .find(|p| p.id == *provider_id)
            .cloned())
    }
}

/// Demo pharmacy network
pub fn demo_pharmacies() -> Vec<Provider> {
    vec![
        Provider::new(
            "MediQuick Pharmacy",
            ProviderCategory::Pharmacy,
            4.8,
            QualityGrade::APlus,
            12,
            ServiceMode::Delivery,
        ),
        Provider::new(
            "City Care Pharmacy",
            ProviderCategory::Pharmacy,
            4.5,
            QualityGrade::A,
            36,
            ServiceMode::Delivery,
        ),
        Provider::new(
            "Wellness Corner Drugstore",
            ProviderCategory::Pharmacy,
            4.9,
            QualityGrade::APlus,
            6,
            ServiceMode::PickupOnly,
        ),
        Provider::new(
            "Suburban Family Pharmacy",
            ProviderCategory::Pharmacy,
            4.2,
            QualityGrade::BPlus,
            60,
            ServiceMode::Delivery,
        ),
    ]
}

/// Demo lab network. Labs move samples and results themselves, so they are
/// all modelled as delivery-capable; the pickup fork is a pharmacy trait.
pub fn demo_labs() -> Vec<Provider> {
    vec![
        Provider::new(
            "Precision Diagnostics",
            ProviderCategory::Lab,
            4.7,
            QualityGrade::APlus,
            18,
            ServiceMode::Delivery,
        ),
        Provider::new(
            "Metro Clinical Labs",
            ProviderCategory::Lab,
            4.4,
            QualityGrade::A,
            30,
            ServiceMode::Delivery,
        ),
        Provider::new(
            "Riverside Pathology",
            ProviderCategory::Lab,
            4.1,
            QualityGrade::B,
            54,
            ServiceMode::Delivery,
        ),
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Provider directory unavailable: {0}")]
    Unavailable(String),
}

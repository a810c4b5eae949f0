pub mod directory;
pub mod provider;

pub use directory::{demo_labs, demo_pharmacies, CatalogError, ProviderDirectory, ProviderSource};
pub use provider::{
    Provider, ProviderCategory, QualityGrade, ServiceMode, SpeedDescriptor, MAX_RATING,
};

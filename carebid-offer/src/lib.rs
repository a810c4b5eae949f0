pub mod book;
pub mod generator;
pub mod models;
pub mod scoring;

pub use book::{OfferBook, OfferError};
pub use generator::{OfferGenerator, OfferRequest, PricingPolicy};
pub use models::{Offer, QualitySnapshot};
pub use scoring::{RankingOutcome, ScoringEngine, ScoringError, ScoringWeights};

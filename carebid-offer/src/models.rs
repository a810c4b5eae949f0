use carebid_catalog::{QualityGrade, SpeedDescriptor, MAX_RATING};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quality attributes captured from the provider at bid time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualitySnapshot {
    pub rating: f64,
    pub grade: QualityGrade,
}

impl QualitySnapshot {
    /// Rating on the 0-5 scale. Falls back to the letter grade's numeric
    /// value when the stored rating is outside the scale.
    pub fn effective_rating(&self) -> f64 {
        if self.rating > 0.0 && self.rating <= MAX_RATING {
            self.rating
        } else {
            self.grade.numeric()
        }
    }
}

/// A provider's priced response to an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,
    pub order_id: Uuid,
    pub provider_id: Uuid,
    pub provider_name: String,
    /// Bid amount in dollars, always positive
    pub amount: f64,
    pub speed: SpeedDescriptor,
    pub quality: QualitySnapshot,
    /// Combined score, assigned by the scoring engine
    pub score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    pub fn new(
        order_id: Uuid,
        provider_id: Uuid,
        provider_name: String,
        amount: f64,
        speed: SpeedDescriptor,
        quality: QualitySnapshot,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            provider_id,
            provider_name,
            amount,
            speed,
            quality,
            score: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_pickup_only(&self) -> bool {
        self.speed == SpeedDescriptor::PickupOnly
    }
}

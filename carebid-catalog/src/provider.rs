use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Top of the 0-5 quality rating scale.
pub const MAX_RATING: f64 = 5.0;

/// Provider categories served by the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderCategory {
    Pharmacy,
    Lab,
}

/// How a provider gets a finished order to the patient
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceMode {
    Delivery,
    PickupOnly,
}

/// Ordinal letter grade from the provider's latest compliance audit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum QualityGrade {
    APlus,
    A,
    BPlus,
    B,
    Other(String),
}

impl QualityGrade {
    /// Parse a grade label ("A+", "B", ...). Unrecognized labels are kept
    /// verbatim under `Other`.
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "A+" => QualityGrade::APlus,
            "A" => QualityGrade::A,
            "B+" => QualityGrade::BPlus,
            "B" => QualityGrade::B,
            other => QualityGrade::Other(other.to_string()),
        }
    }

    /// Numeric value on the rating scale used by scoring.
    /// The 2.0 fallback for unrecognized grades is an arbitrary default
    /// inherited from the audit heuristic, not a validated floor.
    pub fn numeric(&self) -> f64 {
        match self {
            QualityGrade::APlus => 5.0,
            QualityGrade::A => 4.0,
            QualityGrade::BPlus => 3.5,
            QualityGrade::B => 3.0,
            QualityGrade::Other(_) => 2.0,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            QualityGrade::APlus => "A+",
            QualityGrade::A => "A",
            QualityGrade::BPlus => "B+",
            QualityGrade::B => "B",
            QualityGrade::Other(label) => label,
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Delivery-timing vocabulary shared by providers and the offers derived
/// from them. Ordinal: listed fastest first, pickup-only last.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpeedDescriptor {
    SameDay,
    NextDay,
    TwoToThreeDays,
    PickupOnly,
}

impl SpeedDescriptor {
    /// Ordinal rank, lower = faster. Equal descriptors share a rank.
    pub fn rank(&self) -> u8 {
        match self {
            SpeedDescriptor::SameDay => 0,
            SpeedDescriptor::NextDay => 1,
            SpeedDescriptor::TwoToThreeDays => 2,
            SpeedDescriptor::PickupOnly => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SpeedDescriptor::SameDay => "same-day",
            SpeedDescriptor::NextDay => "next-day",
            SpeedDescriptor::TwoToThreeDays => "2-3 days",
            SpeedDescriptor::PickupOnly => "pickup only",
        }
    }
}

impl fmt::Display for SpeedDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A pharmacy or lab in the reference catalog. Static for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub category: ProviderCategory,
    /// Patient rating on the 0-5 scale
    pub rating: f64,
    pub grade: QualityGrade,
    /// Typical hours from acceptance to hand-off
    pub turnaround_hours: u32,
    pub service_mode: ServiceMode,
}

impl Provider {
    pub fn new(
        name: impl Into<String>,
        category: ProviderCategory,
        rating: f64,
        grade: QualityGrade,
        turnaround_hours: u32,
        service_mode: ServiceMode,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category,
            rating,
            grade,
            turnaround_hours,
            service_mode,
        }
    }

    /// Descriptor bucket derived from static capability: pickup-only
    /// providers get the sentinel, delivery providers bucket by turnaround.
    pub fn speed_descriptor(&self) -> SpeedDescriptor {
        match self.service_mode {
            ServiceMode::PickupOnly => SpeedDescriptor::PickupOnly,
            ServiceMode::Delivery => {
                if self.turnaround_hours < 24 {
                    SpeedDescriptor::SameDay
                } else if self.turnaround_hours < 48 {
                    SpeedDescriptor::NextDay
                } else {
                    SpeedDescriptor::TwoToThreeDays
                }
            }
        }
    }

    pub fn offers_delivery(&self) -> bool {
        self.service_mode == ServiceMode::Delivery
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_parsing_and_numeric_scale() {
        assert_eq!(QualityGrade::parse("A+"), QualityGrade::APlus);
        assert_eq!(QualityGrade::parse("B+").numeric(), 3.5);
        assert_eq!(QualityGrade::parse("A").numeric(), 4.0);

        // Unrecognized labels keep their text and fall back to 2.0
        let odd = QualityGrade::parse("C-");
        assert_eq!(odd, QualityGrade::Other("C-".to_string()));
        assert_eq!(odd.numeric(), 2.0);
        assert_eq!(odd.label(), "C-");
    }

    #[test]
    fn test_speed_descriptor_from_capability() {
        let fast = Provider::new(
            "QuickMeds",
            ProviderCategory::Pharmacy,
            4.8,
            QualityGrade::APlus,
            8,
            ServiceMode::Delivery,
        );
        assert_eq!(fast.speed_descriptor(), SpeedDescriptor::SameDay);

        let overnight = Provider::new(
            "City Pharmacy",
            ProviderCategory::Pharmacy,
            4.5,
            QualityGrade::A,
            36,
            ServiceMode::Delivery,
        );
        assert_eq!(overnight.speed_descriptor(), SpeedDescriptor::NextDay);

        let slow = Provider::new(
            "Suburban Dispensary",
            ProviderCategory::Pharmacy,
            4.2,
            QualityGrade::BPlus,
            60,
            ServiceMode::Delivery,
        );
        assert_eq!(slow.speed_descriptor(), SpeedDescriptor::TwoToThreeDays);

        // Pickup-only trumps turnaround, even a fast one
        let counter = Provider::new(
            "Corner Drugstore",
            ProviderCategory::Pharmacy,
            4.9,
            QualityGrade::APlus,
            4,
            ServiceMode::PickupOnly,
        );
        assert_eq!(counter.speed_descriptor(), SpeedDescriptor::PickupOnly);
        assert!(!counter.offers_delivery());
    }

    #[test]
    fn test_speed_rank_ordering() {
        assert!(SpeedDescriptor::SameDay.rank() < SpeedDescriptor::NextDay.rank());
        assert!(SpeedDescriptor::NextDay.rank() < SpeedDescriptor::TwoToThreeDays.rank());
        assert!(SpeedDescriptor::TwoToThreeDays.rank() < SpeedDescriptor::PickupOnly.rank());
    }
}

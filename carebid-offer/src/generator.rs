use crate::models::{Offer, QualitySnapshot};
use carebid_catalog::{Provider, ProviderCategory};
use rand::Rng;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

/// Pricing constants used to synthesize competing bids
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Dollars per medication line
    pub medication_unit_price: f64,
    /// Dollars per test line
    pub test_unit_price: f64,
    /// Uniform perturbation applied to each bid, in +/- dollars
    pub perturbation: f64,
    /// Lowest admissible medication bid
    pub medication_floor: f64,
    /// Lowest admissible lab bid
    pub test_floor: f64,
    /// Discount per rating point
    pub rating_discount: f64,
    /// Surcharge per 24h of turnaround
    pub latency_penalty_per_day: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            medication_unit_price: 15.0,
            test_unit_price: 40.0,
            perturbation: 8.0,
            medication_floor: 10.0,
            test_floor: 25.0,
            rating_discount: 2.0,
            latency_penalty_per_day: 1.5,
        }
    }
}

impl PricingPolicy {
    fn unit_price(&self, category: ProviderCategory) -> f64 {
        match category {
            ProviderCategory::Pharmacy => self.medication_unit_price,
            ProviderCategory::Lab => self.test_unit_price,
        }
    }

    fn floor(&self, category: ProviderCategory) -> f64 {
        match category {
            ProviderCategory::Pharmacy => self.medication_floor,
            ProviderCategory::Lab => self.test_floor,
        }
    }
}

/// The slice of an order the generator needs to price bids
#[derive(Debug, Clone, Copy)]
pub struct OfferRequest {
    pub order_id: Uuid,
    pub category: ProviderCategory,
    pub line_count: usize,
}

/// Produces one synthetic competing bid per provider.
///
/// Pure function of its inputs and the injected random source; tests seed
/// the source for reproducible pricing.
pub struct OfferGenerator<R: Rng> {
    policy: PricingPolicy,
    rng: R,
}

impl<R: Rng> OfferGenerator<R> {
    pub fn new(policy: PricingPolicy, rng: R) -> Self {
        Self { policy, rng }
    }

    /// One offer per provider. An empty provider slice yields an empty
    /// vec, the caller's "no offers available" terminal, not an error.
    pub fn generate(&mut self, request: &OfferRequest, providers: &[Provider]) -> Vec<Offer> {
        if providers.is_empty() {
            debug!(order_id = %request.order_id, "no providers available for solicitation");
            return Vec::new();
        }

        let base = request.line_count as f64 * self.policy.unit_price(request.category);
        let floor = self.policy.floor(request.category);

        providers
            .iter()
            .filter(|provider| {
                if provider.category == request.category {
                    true
                } else {
                    debug!(provider = %provider.name, "skipping provider outside order category");
                    false
                }
            })
            .map(|provider| {
                let perturbation = self
                    .rng
                    .gen_range(-self.policy.perturbation..=self.policy.perturbation);
                let discount = provider.rating * self.policy.rating_discount;
                let penalty = provider.turnaround_hours as f64 / 24.0
                    * self.policy.latency_penalty_per_day;
                let amount = round_cents((base + perturbation - discount + penalty).max(floor));

                Offer::new(
                    request.order_id,
                    provider.id,
                    provider.name.clone(),
                    amount,
                    provider.speed_descriptor(),
                    QualitySnapshot {
                        rating: provider.rating,
                        grade: provider.grade.clone(),
                    },
                )
            })
            .collect()
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebid_catalog::{demo_pharmacies, QualityGrade, ServiceMode, SpeedDescriptor};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn medication_request(line_count: usize) -> OfferRequest {
        OfferRequest {
            order_id: Uuid::new_v4(),
            category: ProviderCategory::Pharmacy,
            line_count,
        }
    }

    #[test]
    fn test_one_offer_per_provider_with_positive_amounts() {
        let providers = demo_pharmacies();
        let mut generator =
            OfferGenerator::new(PricingPolicy::default(), StdRng::seed_from_u64(7));

        let offers = generator.generate(&medication_request(3), &providers);

        assert_eq!(offers.len(), providers.len());
        for (offer, provider) in offers.iter().zip(&providers) {
            assert_eq!(offer.provider_id, provider.id);
            assert!(offer.amount > 0.0);
            assert_eq!(offer.speed, provider.speed_descriptor());
        }

        let mut ids: Vec<_> = offers.iter().map(|o| o.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), offers.len());
    }

    #[test]
    fn test_empty_catalog_yields_no_offers() {
        let mut generator =
            OfferGenerator::new(PricingPolicy::default(), StdRng::seed_from_u64(7));
        let offers = generator.generate(&medication_request(2), &[]);
        assert!(offers.is_empty());
    }

    #[test]
    fn test_floor_holds_for_degenerate_orders() {
        // Zero lines price from a base of 0; the floor keeps bids physical.
        let providers = demo_pharmacies();
        let mut generator =
            OfferGenerator::new(PricingPolicy::default(), StdRng::seed_from_u64(99));

        let offers = generator.generate(&medication_request(0), &providers);
        for offer in offers {
            assert!(offer.amount >= PricingPolicy::default().medication_floor);
        }
    }

    #[test]
    fn test_seeded_rng_reproduces_pricing() {
        let providers = demo_pharmacies();
        let request = medication_request(2);

        let offers_a = OfferGenerator::new(PricingPolicy::default(), StdRng::seed_from_u64(42))
            .generate(&request, &providers);
        let offers_b = OfferGenerator::new(PricingPolicy::default(), StdRng::seed_from_u64(42))
            .generate(&request, &providers);

        let amounts_a: Vec<f64> = offers_a.iter().map(|o| o.amount).collect();
        let amounts_b: Vec<f64> = offers_b.iter().map(|o| o.amount).collect();
        assert_eq!(amounts_a, amounts_b);
    }

    #[test]
    fn test_pickup_only_provider_gets_sentinel_descriptor() {
        let counter = Provider::new(
            "Corner Drugstore",
            ProviderCategory::Pharmacy,
            4.9,
            QualityGrade::APlus,
            4,
            ServiceMode::PickupOnly,
        );
        let mut generator =
            OfferGenerator::new(PricingPolicy::default(), StdRng::seed_from_u64(1));

        let offers = generator.generate(&medication_request(1), &[counter]);
        assert_eq!(offers[0].speed, SpeedDescriptor::PickupOnly);
    }

    #[test]
    fn test_mismatched_category_is_skipped() {
        let lab = Provider::new(
            "Precision Diagnostics",
            ProviderCategory::Lab,
            4.7,
            QualityGrade::APlus,
            18,
            ServiceMode::Delivery,
        );
        let mut generator =
            OfferGenerator::new(PricingPolicy::default(), StdRng::seed_from_u64(1));

        let offers = generator.generate(&medication_request(1), &[lab]);
        assert!(offers.is_empty());
    }
}

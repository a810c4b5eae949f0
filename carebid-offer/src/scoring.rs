use crate::models::Offer;
use carebid_catalog::MAX_RATING;
use serde::Deserialize;
use tracing::info;

/// Relative importance of price, speed, and quality when ranking bids.
///
/// Weights are expected to sum to 1.0 so the combined score keeps its
/// [0,1] reading; the engine only enforces non-negativity and a positive
/// sum, since relative ranking is valid either way.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScoringWeights {
    pub price: f64,
    pub speed: f64,
    pub quality: f64,
}

impl ScoringWeights {
    pub fn new(price: f64, speed: f64, quality: f64) -> Result<Self, ScoringError> {
        for (name, value) in [("price", price), ("speed", speed), ("quality", quality)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::InvalidWeights(format!(
                    "{name} weight must be a non-negative number, got {value}"
                )));
            }
        }
        if price + speed + quality <= 0.0 {
            return Err(ScoringError::InvalidWeights(
                "weights must not all be zero".to_string(),
            ));
        }
        Ok(Self {
            price,
            speed,
            quality,
        })
    }

    /// Price-heavy defaults used for medication orders
    pub fn medication_default() -> Self {
        Self {
            price: 0.6,
            speed: 0.2,
            quality: 0.2,
        }
    }

    /// More balanced defaults used for lab orders
    pub fn lab_default() -> Self {
        Self {
            price: 0.5,
            speed: 0.3,
            quality: 0.2,
        }
    }
}

/// Outcome of ranking a non-empty offer set
#[derive(Debug, Clone)]
pub struct RankingOutcome {
    /// The committed offer; always a member of `ranked`
    pub winner: Offer,
    /// All offers with scores attached, best first (ties keep input order)
    pub ranked: Vec<Offer>,
}

/// Scores offers against a weight vector and commits to a winner.
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Returns `None` for an empty offer set; callers must treat that as a
    /// terminal "could not fulfill" state rather than retrying.
    ///
    /// Each dimension is min-max normalized across the full offer set
    /// (lower price and lower speed rank score higher). A degenerate range
    /// scores 1.0 everywhere so the dimension cancels out of the ranking.
    /// An exact score tie resolves to the first offer in input order.
    pub fn select_winner(&self, offers: &[Offer]) -> Option<RankingOutcome> {
        if offers.is_empty() {
            return None;
        }

        let min_price = offers.iter().map(|o| o.amount).fold(f64::INFINITY, f64::min);
        let max_price = offers
            .iter()
            .map(|o| o.amount)
            .fold(f64::NEG_INFINITY, f64::max);
        let min_rank = offers
            .iter()
            .map(|o| o.speed.rank() as f64)
            .fold(f64::INFINITY, f64::min);
        let max_rank = offers
            .iter()
            .map(|o| o.speed.rank() as f64)
            .fold(f64::NEG_INFINITY, f64::max);

        let scores: Vec<f64> = offers
            .iter()
            .map(|offer| {
                let norm_price = normalize_inverted(offer.amount, min_price, max_price);
                let norm_speed =
                    normalize_inverted(offer.speed.rank() as f64, min_rank, max_rank);
                let norm_quality = offer.quality.effective_rating() / MAX_RATING;

                norm_price * self.weights.price
                    + norm_speed * self.weights.speed
                    + norm_quality * self.weights.quality
            })
            .collect();

        // Strictly-greater comparison keeps the first offer on exact ties.
        let mut winner_idx = 0;
        for (idx, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[winner_idx] {
                winner_idx = idx;
            }
        }

        let scored: Vec<Offer> = offers
            .iter()
            .zip(&scores)
            .map(|(offer, score)| {
                let mut offer = offer.clone();
                offer.score = Some(*score);
                offer
            })
            .collect();

        let winner = scored[winner_idx].clone();
        info!(
            order_id = %winner.order_id,
            provider = %winner.provider_name,
            amount = winner.amount,
            score = scores[winner_idx],
            "winning offer selected"
        );

        let mut ranked = scored;
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Some(RankingOutcome { winner, ranked })
    }
}

/// Min-max normalization where lower raw values score higher. A collapsed
/// range maps every value to 1.0 instead of dividing by zero.
fn normalize_inverted(value: f64, min: f64, max: f64) -> f64 {
    if max - min <= f64::EPSILON {
        1.0
    } else {
        1.0 - (value - min) / (max - min)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Invalid scoring weights: {0}")]
    InvalidWeights(String),
}

use crate::models::{Order, OrderCategory, OrderError};
use crate::simulation::{FulfillmentSimulation, SimulationHandle, StatusUpdate, TimingPolicy};
use carebid_catalog::ProviderSource;
use carebid_offer::{
    Offer, OfferBook, OfferGenerator, OfferRequest, PricingPolicy, ScoringEngine, ScoringWeights,
};
use carebid_shared::models::events::{EngineEvent, OffersSolicitedEvent, WinnerSelectedEvent};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// The engine's tunable surface, loadable from configuration files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pricing: PricingPolicy,
    pub timing: TimingPolicy,
    pub medication_weights: ScoringWeights,
    pub lab_weights: ScoringWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pricing: PricingPolicy::default(),
            timing: TimingPolicy::default(),
            medication_weights: ScoringWeights::medication_default(),
            lab_weights: ScoringWeights::lab_default(),
        }
    }
}

/// An order accepted by the engine: its scored offers, the committed
/// winner, and the live status stream of its fulfillment simulation.
pub struct SubmittedOrder {
    pub order: Order,
    /// Scored offers, best first; empty when no providers were available
    pub offers: Vec<Offer>,
    pub winner: Option<Offer>,
    pub statuses: mpsc::Receiver<StatusUpdate>,
    pub handle: SimulationHandle,
}

/// One parameterized pipeline for both order categories: solicit bids,
/// rank them, commit a winner, and drive the fulfillment simulation.
pub struct OrderOrchestrator {
    providers: Arc<dyn ProviderSource>,
    pricing: PricingPolicy,
    timing: TimingPolicy,
    medication_weights: ScoringWeights,
    lab_weights: ScoringWeights,
    book: OfferBook,
    events: Option<mpsc::UnboundedSender<EngineEvent>>,
}

impl OrderOrchestrator {
    /// Weight vectors are validated here, at the boundary; the scoring
    /// engine never self-corrects them.
    pub fn new(
        providers: Arc<dyn ProviderSource>,
        config: EngineConfig,
    ) -> Result<Self, OrderError> {
        let medication_weights = ScoringWeights::new(
            config.medication_weights.price,
            config.medication_weights.speed,
            config.medication_weights.quality,
        )?;
        let lab_weights = ScoringWeights::new(
            config.lab_weights.price,
            config.lab_weights.speed,
            config.lab_weights.quality,
        )?;

        Ok(Self {
            providers,
            pricing: config.pricing,
            timing: config.timing,
            medication_weights,
            lab_weights,
            book: OfferBook::new(),
            events: None,
        })
    }

    /// Attach a sink for the engine's typed events.
    pub fn with_event_sink(mut self, events: mpsc::UnboundedSender<EngineEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn offer_book(&self) -> &OfferBook {
        &self.book
    }

    /// Run the full pipeline for one order. An empty catalog is not an
    /// error: the returned order has no winner and its simulation stalls
    /// in BROADCASTING for the caller to render "no offers available".
    pub async fn submit(&mut self, order: Order) -> Result<SubmittedOrder, OrderError> {
        let catalog = self
            .providers
            .providers_for(order.category.provider_category())
            .await?;
        info!(
            order_id = %order.id,
            category = ?order.category,
            providers = catalog.len(),
            "soliciting offers"
        );

        let request = OfferRequest {
            order_id: order.id,
            category: order.category.provider_category(),
            line_count: order.line_count(),
        };
        let mut generator = OfferGenerator::new(self.pricing.clone(), StdRng::from_entropy());
        let offers = generator.generate(&request, &catalog);

        self.emit(EngineEvent::OffersSolicited(OffersSolicitedEvent {
            order_id: order.id,
            offer_count: offers.len(),
            timestamp: Utc::now().timestamp(),
        }));
        self.book.record(order.id, offers.clone())?;

        let weights = match order.category {
            OrderCategory::Medication => self.medication_weights,
            OrderCategory::LabTest => self.lab_weights,
        };
        let outcome = ScoringEngine::new(weights).select_winner(&offers);

        let (winner, ranked) = match outcome {
            Some(outcome) => {
                self.book.set_winner(order.id, outcome.winner.id)?;
                self.emit(EngineEvent::WinnerSelected(WinnerSelectedEvent {
                    order_id: order.id,
                    offer_id: outcome.winner.id,
                    provider_name: outcome.winner.provider_name.clone(),
                    amount: outcome.winner.amount,
                    score: outcome.winner.score.unwrap_or_default(),
                    timestamp: Utc::now().timestamp(),
                }));
                (Some(outcome.winner), outcome.ranked)
            }
            None => {
                info!(order_id = %order.id, "no offers available, order cannot be fulfilled");
                (None, Vec::new())
            }
        };

        let (handle, statuses) = FulfillmentSimulation::spawn(
            order.clone(),
            !offers.is_empty(),
            winner.clone(),
            self.timing.clone(),
            StdRng::from_entropy(),
            self.events.clone(),
        );

        Ok(SubmittedOrder {
            order,
            offers: ranked,
            winner,
            statuses,
            handle,
        })
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

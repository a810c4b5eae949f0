use crate::milestones::{AdvanceContext, FulfillmentTrack, Milestone, Transition};
use crate::models::Order;
use carebid_offer::Offer;
use carebid_shared::models::events::{EngineEvent, FulfillmentAdvancedEvent};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};
use uuid::Uuid;

/// Delay window between simulated transitions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingPolicy {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            min_delay_ms: 1500,
            max_delay_ms: 6000,
        }
    }
}

impl TimingPolicy {
    fn delay(&self, rng: &mut StdRng) -> Duration {
        let max = self.max_delay_ms.max(self.min_delay_ms);
        Duration::from_millis(rng.gen_range(self.min_delay_ms..=max))
    }
}

/// Snapshot emitted on every simulated milestone change
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub order_id: Uuid,
    pub milestone: Milestone,
    pub index: usize,
    pub is_terminal: bool,
    pub display_text: String,
}

/// Cancellation handle for a running simulation
pub struct SimulationHandle {
    cancel_tx: mpsc::Sender<()>,
}

impl SimulationHandle {
    /// Freeze the simulation at its current milestone and mark the order
    /// abandoned. A no-op once the order has reached a terminal milestone.
    pub async fn cancel(&self) {
        let _ = self.cancel_tx.send(()).await;
    }
}

/// Timed driver for one order's fulfillment progression.
///
/// Each order runs as an independent tokio task; orders share no state.
/// The solicitation-gated transitions fire as soon as their inputs are
/// known, later ones after a randomized delay from the timing policy.
pub struct FulfillmentSimulation;

impl FulfillmentSimulation {
    pub fn spawn(
        order: Order,
        offers_exist: bool,
        winner: Option<Offer>,
        timing: TimingPolicy,
        mut rng: StdRng,
        events: Option<mpsc::UnboundedSender<EngineEvent>>,
    ) -> (SimulationHandle, mpsc::Receiver<StatusUpdate>) {
        let (status_tx, status_rx) = mpsc::channel(64);
        let (cancel_tx, mut cancel_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            let track = FulfillmentTrack::new(order.category);
            let mut state = track.initial();

            let initial = track.describe(
                &state,
                &order,
                AdvanceContext {
                    offers_exist,
                    winner: winner.as_ref(),
                },
            );
            if status_tx.send(to_status(&order, &initial)).await.is_err() {
                return;
            }

            loop {
                let delay = match state.milestone {
                    // Gated transitions fire as soon as their inputs are known
                    Milestone::Broadcasting | Milestone::Evaluating => Duration::ZERO,
                    _ => timing.delay(&mut rng),
                };

                tokio::select! {
                    _ = cancelled(&mut cancel_rx) => {
                        let frozen = track.abandon(&state, &order);
                        emit_event(&events, &order, &frozen);
                        let _ = status_tx.send(to_status(&order, &frozen)).await;
                        info!(order_id = %order.id, "fulfillment abandoned");
                        return;
                    }
                    _ = sleep(delay) => {}
                }

                let transition = track.advance(
                    &state,
                    &order,
                    AdvanceContext {
                        offers_exist,
                        winner: winner.as_ref(),
                    },
                );

                if transition.state == state {
                    // Stalled at a gate (no offers or no winner). Nothing in
                    // this session can unstick it, so park until cancelled or
                    // the consumer goes away.
                    debug!(order_id = %order.id, milestone = ?state.milestone, "fulfillment stalled");
                    tokio::select! {
                        _ = cancelled(&mut cancel_rx) => {
                            let frozen = track.abandon(&state, &order);
                            emit_event(&events, &order, &frozen);
                            let _ = status_tx.send(to_status(&order, &frozen)).await;
                        }
                        _ = status_tx.closed() => {}
                    }
                    return;
                }

                state = transition.state.clone();
                emit_event(&events, &order, &transition);
                if status_tx.send(to_status(&order, &transition)).await.is_err() {
                    return;
                }

                if transition.is_terminal {
                    info!(order_id = %order.id, milestone = state.milestone.name(), "fulfillment complete");
                    return;
                }
            }
        });

        (SimulationHandle { cancel_tx }, status_rx)
    }
}

/// Resolves only on an explicit cancel. A dropped handle must not abandon
/// the order, so channel closure parks forever instead.
async fn cancelled(cancel_rx: &mut mpsc::Receiver<()>) {
    if cancel_rx.recv().await.is_none() {
        std::future::pending::<()>().await;
    }
}

fn to_status(order: &Order, transition: &Transition) -> StatusUpdate {
    StatusUpdate {
        order_id: order.id,
        milestone: transition.state.milestone,
        index: transition.state.index,
        is_terminal: transition.is_terminal,
        display_text: transition.display_text.clone(),
    }
}

fn emit_event(
    events: &Option<mpsc::UnboundedSender<EngineEvent>>,
    order: &Order,
    transition: &Transition,
) {
    if let Some(tx) = events {
        let _ = tx.send(EngineEvent::FulfillmentAdvanced(FulfillmentAdvancedEvent {
            order_id: order.id,
            milestone: transition.state.milestone.name().to_string(),
            is_terminal: transition.is_terminal,
            timestamp: Utc::now().timestamp(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClinicianContext, MedicationItem, Order};
    use carebid_catalog::{QualityGrade, SpeedDescriptor};
    use carebid_offer::QualitySnapshot;
    use rand::SeedableRng;

    fn medication_order() -> Order {
        Order::medication(
            vec![MedicationItem {
                name: "Metformin".to_string(),
                dosage: "850mg".to_string(),
                instructions: "With meals".to_string(),
            }],
            ClinicianContext {
                clinician_name: "Dr. Okafor".to_string(),
                patient_name: "Jamie Rivera".to_string(),
            },
        )
    }

    fn winner(order: &Order, speed: SpeedDescriptor) -> Offer {
        Offer::new(
            order.id,
            Uuid::new_v4(),
            "MediQuick Pharmacy".to_string(),
            31.75,
            speed,
            QualitySnapshot {
                rating: 4.8,
                grade: QualityGrade::APlus,
            },
        )
    }

    async fn drain(mut rx: mpsc::Receiver<StatusUpdate>) -> Vec<StatusUpdate> {
        let mut updates = Vec::new();
        while let Some(update) = rx.recv().await {
            let done = update.is_terminal;
            updates.push(update);
            if done {
                break;
            }
        }
        updates
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_run_reaches_delivered() {
        let order = medication_order();
        let winning = winner(&order, SpeedDescriptor::SameDay);
        let (_handle, rx) = FulfillmentSimulation::spawn(
            order,
            true,
            Some(winning),
            TimingPolicy::default(),
            StdRng::seed_from_u64(3),
            None,
        );

        let updates = drain(rx).await;
        let milestones: Vec<Milestone> = updates.iter().map(|u| u.milestone).collect();

        assert_eq!(milestones.first(), Some(&Milestone::Broadcasting));
        assert_eq!(milestones.last(), Some(&Milestone::Delivered));
        assert!(!milestones.contains(&Milestone::ReadyForPickup));

        // Indices never regress
        for pair in updates.windows(2) {
            assert!(pair[1].index >= pair[0].index);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pickup_run_skips_delivery() {
        let order = medication_order();
        let winning = winner(&order, SpeedDescriptor::PickupOnly);
        let (_handle, rx) = FulfillmentSimulation::spawn(
            order,
            true,
            Some(winning),
            TimingPolicy::default(),
            StdRng::seed_from_u64(4),
            None,
        );

        let milestones: Vec<Milestone> =
            drain(rx).await.iter().map(|u| u.milestone).collect();
        assert_eq!(milestones.last(), Some(&Milestone::ReadyForPickup));
        assert!(!milestones.contains(&Milestone::OutForDelivery));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_offers_stalls_then_cancel_abandons() {
        let order = medication_order();
        let (handle, mut rx) = FulfillmentSimulation::spawn(
            order,
            false,
            None,
            TimingPolicy::default(),
            StdRng::seed_from_u64(5),
            None,
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(first.milestone, Milestone::Broadcasting);
        assert!(!first.is_terminal);

        handle.cancel().await;
        let last = rx.recv().await.unwrap();
        assert_eq!(last.milestone, Milestone::Abandoned);
        assert!(last.is_terminal);
        assert_eq!(last.index, first.index);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_run_emits_abandoned() {
        let order = medication_order();
        let winning = winner(&order, SpeedDescriptor::SameDay);
        // A wide window keeps the task parked in its delay when we cancel
        let timing = TimingPolicy {
            min_delay_ms: 60_000,
            max_delay_ms: 60_000,
        };
        let (handle, mut rx) = FulfillmentSimulation::spawn(
            order,
            true,
            Some(winning),
            timing,
            StdRng::seed_from_u64(6),
            None,
        );

        // Broadcasting, evaluating, and assignment land without delay
        let mut update = rx.recv().await.unwrap();
        while update.milestone != Milestone::Assigned {
            update = rx.recv().await.unwrap();
        }

        handle.cancel().await;
        let last = rx.recv().await.unwrap();
        assert_eq!(last.milestone, Milestone::Abandoned);
        assert!(last.is_terminal);

        // Cancel after terminal is a no-op
        handle.cancel().await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_mirror_milestones() {
        let order = medication_order();
        let winning = winner(&order, SpeedDescriptor::SameDay);
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let (_handle, rx) = FulfillmentSimulation::spawn(
            order,
            true,
            Some(winning),
            TimingPolicy::default(),
            StdRng::seed_from_u64(7),
            Some(event_tx),
        );

        let updates = drain(rx).await;

        let mut advanced = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            if let EngineEvent::FulfillmentAdvanced(e) = event {
                advanced.push(e.milestone);
            }
        }
        // The initial broadcast status has no event; every advance does
        assert_eq!(advanced.len(), updates.len() - 1);
        assert_eq!(advanced.last().map(String::as_str), Some("DELIVERED"));
    }
}

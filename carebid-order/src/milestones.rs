//! Fulfillment milestone tracks and the pure transition function.
//!
//! Three track shapes share a solicitation prefix:
//!
//! ```text
//! BROADCASTING → EVALUATING → ASSIGNED → ...
//!   medication, delivery winner: PREPARING → PACKED → OUT_FOR_DELIVERY → DELIVERED
//!   medication, pickup winner:   PREPARING → PACKED → READY_FOR_PICKUP
//!   lab test:                    INSTRUCTIONS_GENERATING → INSTRUCTIONS_READY →
//!                                SAMPLE_SCHEDULED → SAMPLE_RECEIVED → ANALYZING →
//!                                RESULTS_SUBMITTED → SUMMARY_GENERATING →
//!                                DOCTOR_REVIEWING → FINALIZING
//! ```
//!
//! `BROADCASTING → EVALUATING` is gated on offers existing and
//! `EVALUATING → ASSIGNED` on a committed winner; the machine stalls at the
//! gate rather than failing. Terminal milestones are absorbing. `ABANDONED`
//! is an out-of-track terminal reached only through cancellation.

use crate::models::{Order, OrderCategory};
use carebid_offer::Offer;
use carebid_catalog::SpeedDescriptor;
use serde::{Deserialize, Serialize};

/// One named step of a fulfillment sequence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Milestone {
    Broadcasting,
    Evaluating,
    Assigned,
    Preparing,
    Packed,
    OutForDelivery,
    Delivered,
    ReadyForPickup,
    InstructionsGenerating,
    InstructionsReady,
    SampleScheduled,
    SampleReceived,
    Analyzing,
    ResultsSubmitted,
    SummaryGenerating,
    DoctorReviewing,
    Finalizing,
    Abandoned,
}

impl Milestone {
    /// Canonical wire name, matching the serde representation.
    pub fn name(&self) -> &'static str {
        match self {
            Milestone::Broadcasting => "BROADCASTING",
            Milestone::Evaluating => "EVALUATING",
            Milestone::Assigned => "ASSIGNED",
            Milestone::Preparing => "PREPARING",
            Milestone::Packed => "PACKED",
            Milestone::OutForDelivery => "OUT_FOR_DELIVERY",
            Milestone::Delivered => "DELIVERED",
            Milestone::ReadyForPickup => "READY_FOR_PICKUP",
            Milestone::InstructionsGenerating => "INSTRUCTIONS_GENERATING",
            Milestone::InstructionsReady => "INSTRUCTIONS_READY",
            Milestone::SampleScheduled => "SAMPLE_SCHEDULED",
            Milestone::SampleReceived => "SAMPLE_RECEIVED",
            Milestone::Analyzing => "ANALYZING",
            Milestone::ResultsSubmitted => "RESULTS_SUBMITTED",
            Milestone::SummaryGenerating => "SUMMARY_GENERATING",
            Milestone::DoctorReviewing => "DOCTOR_REVIEWING",
            Milestone::Finalizing => "FINALIZING",
            Milestone::Abandoned => "ABANDONED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Milestone::Delivered
                | Milestone::ReadyForPickup
                | Milestone::Finalizing
                | Milestone::Abandoned
        )
    }
}

/// Delivery-mode fork taken by medication tracks after packing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Delivery,
    Pickup,
}

impl DeliveryMode {
    pub fn of(offer: &Offer) -> Self {
        if offer.is_pickup_only() {
            DeliveryMode::Pickup
        } else {
            DeliveryMode::Delivery
        }
    }
}

const MEDICATION_DELIVERY_TRACK: &[Milestone] = &[
    Milestone::Broadcasting,
    Milestone::Evaluating,
    Milestone::Assigned,
    Milestone::Preparing,
    Milestone::Packed,
    Milestone::OutForDelivery,
    Milestone::Delivered,
];

const MEDICATION_PICKUP_TRACK: &[Milestone] = &[
    Milestone::Broadcasting,
    Milestone::Evaluating,
    Milestone::Assigned,
    Milestone::Preparing,
    Milestone::Packed,
    Milestone::ReadyForPickup,
];

const LAB_TRACK: &[Milestone] = &[
    Milestone::Broadcasting,
    Milestone::Evaluating,
    Milestone::Assigned,
    Milestone::InstructionsGenerating,
    Milestone::InstructionsReady,
    Milestone::SampleScheduled,
    Milestone::SampleReceived,
    Milestone::Analyzing,
    Milestone::ResultsSubmitted,
    Milestone::SummaryGenerating,
    Milestone::DoctorReviewing,
    Milestone::Finalizing,
];

/// Progress cursor for one order's fulfillment. The index is monotonic
/// non-decreasing and bounded by the applicable track length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FulfillmentState {
    pub milestone: Milestone,
    pub index: usize,
}

impl FulfillmentState {
    fn initial() -> Self {
        Self {
            milestone: Milestone::Broadcasting,
            index: 0,
        }
    }
}

/// Inputs gating the solicitation-phase transitions
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvanceContext<'a> {
    pub offers_exist: bool,
    pub winner: Option<&'a Offer>,
}

/// Result of one advance call
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: FulfillmentState,
    pub is_terminal: bool,
    pub display_text: String,
}

/// The milestone sequence for one order category.
#[derive(Debug, Clone, Copy)]
pub struct FulfillmentTrack {
    category: OrderCategory,
}

impl FulfillmentTrack {
    pub fn new(category: OrderCategory) -> Self {
        Self { category }
    }

    /// Every order starts broadcasting.
    pub fn initial(&self) -> FulfillmentState {
        FulfillmentState::initial()
    }

    /// The full milestone list for a resolved delivery mode, for callers
    /// that render progress bars.
    pub fn milestones(&self, mode: DeliveryMode) -> &'static [Milestone] {
        match (self.category, mode) {
            (OrderCategory::LabTest, _) => LAB_TRACK,
            (OrderCategory::Medication, DeliveryMode::Delivery) => MEDICATION_DELIVERY_TRACK,
            (OrderCategory::Medication, DeliveryMode::Pickup) => MEDICATION_PICKUP_TRACK,
        }
    }

    /// Describe the current state without advancing it.
    pub fn describe(
        &self,
        state: &FulfillmentState,
        order: &Order,
        ctx: AdvanceContext<'_>,
    ) -> Transition {
        Transition {
            state: state.clone(),
            is_terminal: state.milestone.is_terminal(),
            display_text: display_text(state.milestone, order, ctx.winner),
        }
    }

    /// Advance one step. Stalls (returns the unchanged state) while a gate
    /// is unsatisfied; absorbs at terminal milestones. Never fails.
    pub fn advance(
        &self,
        state: &FulfillmentState,
        order: &Order,
        ctx: AdvanceContext<'_>,
    ) -> Transition {
        if state.milestone.is_terminal() {
            return self.describe(state, order, ctx);
        }

        let next = match state.milestone {
            Milestone::Broadcasting if !ctx.offers_exist => None,
            Milestone::Broadcasting => Some(Milestone::Evaluating),
            Milestone::Evaluating if ctx.winner.is_none() => None,
            Milestone::Evaluating => Some(Milestone::Assigned),
            current => self.successor(current, ctx.winner.map(DeliveryMode::of)),
        };

        match next {
            Some(milestone) => {
                let state = FulfillmentState {
                    milestone,
                    index: state.index + 1,
                };
                Transition {
                    is_terminal: milestone.is_terminal(),
                    display_text: display_text(milestone, order, ctx.winner),
                    state,
                }
            }
            None => self.describe(state, order, ctx),
        }
    }

    /// Freeze progression: the abandoned terminal keeps the current index.
    pub fn abandon(&self, state: &FulfillmentState, order: &Order) -> Transition {
        if state.milestone.is_terminal() {
            return self.describe(state, order, AdvanceContext::default());
        }
        Transition {
            state: FulfillmentState {
                milestone: Milestone::Abandoned,
                index: state.index,
            },
            is_terminal: true,
            display_text: display_text(Milestone::Abandoned, order, None),
        }
    }

    fn successor(&self, current: Milestone, mode: Option<DeliveryMode>) -> Option<Milestone> {
        let track = match (self.category, mode) {
            (OrderCategory::LabTest, _) => LAB_TRACK,
            (OrderCategory::Medication, Some(DeliveryMode::Delivery)) => MEDICATION_DELIVERY_TRACK,
            (OrderCategory::Medication, Some(DeliveryMode::Pickup)) => MEDICATION_PICKUP_TRACK,
            // The fork cannot be resolved without a winner; stall.
            (OrderCategory::Medication, None) => return None,
        };
        track
            .iter()
            .position(|m| *m == current)
            .and_then(|i| track.get(i + 1).copied())
    }
}

/// Patient-facing status line for a milestone. With no winner committed
/// yet, arms that name the provider render a neutral pending message
/// instead of leaking a placeholder.
fn display_text(milestone: Milestone, order: &Order, winner: Option<&Offer>) -> String {
    let clinician = order.clinician.clinician_name.as_str();
    let provider = winner.map(|w| w.provider_name.as_str());

    match milestone {
        Milestone::Broadcasting => match order.category {
            OrderCategory::Medication => {
                "Broadcasting your prescription to nearby pharmacies...".to_string()
            }
            OrderCategory::LabTest => {
                "Broadcasting your test order to partner labs...".to_string()
            }
        },
        Milestone::Evaluating => "Evaluating incoming offers...".to_string(),
        Milestone::Assigned => match provider {
            Some(p) => format!("{p} accepted the order from {clinician}"),
            None => "Waiting for a provider to be assigned...".to_string(),
        },
        Milestone::Preparing => match provider {
            Some(p) => format!("{p} is preparing your medications..."),
            None => "Your medications are being prepared...".to_string(),
        },
        Milestone::Packed => match provider {
            Some(p) => format!("Your order is packed and sealed at {p}"),
            None => "Your order is packed and sealed".to_string(),
        },
        Milestone::OutForDelivery => match winner {
            Some(w) => format!(
                "Out for delivery from {}, estimated arrival {}",
                w.provider_name,
                eta_phrase(w.speed)
            ),
            None => "Your order is out for delivery".to_string(),
        },
        Milestone::Delivered => format!("Delivered. Take as directed by {clinician}."),
        Milestone::ReadyForPickup => match provider {
            Some(p) => format!("Ready for pickup at {p}"),
            None => "Your order is ready for pickup".to_string(),
        },
        Milestone::InstructionsGenerating => match provider {
            Some(p) => format!("{p} is generating sample collection instructions..."),
            None => "Generating sample collection instructions...".to_string(),
        },
        Milestone::InstructionsReady => {
            "Collection instructions are ready. Review them before your appointment.".to_string()
        }
        Milestone::SampleScheduled => match winner {
            Some(w) => format!(
                "Sample collection scheduled with {} {}",
                w.provider_name,
                slot_phrase(w.speed)
            ),
            None => "Sample collection is being scheduled...".to_string(),
        },
        Milestone::SampleReceived => match provider {
            Some(p) => format!("{p} received your sample"),
            None => "Your sample was received".to_string(),
        },
        Milestone::Analyzing => match provider {
            Some(p) => format!("{p} is analyzing your sample..."),
            None => "Your sample is being analyzed...".to_string(),
        },
        Milestone::ResultsSubmitted => "Results submitted for clinical review".to_string(),
        Milestone::SummaryGenerating => "Generating your results summary...".to_string(),
        Milestone::DoctorReviewing => format!("{clinician} is reviewing your results..."),
        Milestone::Finalizing => {
            format!("Report finalized by {clinician}. Results are available in your chart.")
        }
        Milestone::Abandoned => "Order abandoned before completion".to_string(),
    }
}

fn eta_phrase(speed: SpeedDescriptor) -> &'static str {
    match speed {
        SpeedDescriptor::SameDay => "later today",
        SpeedDescriptor::NextDay => "tomorrow",
        SpeedDescriptor::TwoToThreeDays => "in 2-3 days",
        SpeedDescriptor::PickupOnly => "at the counter",
    }
}

fn slot_phrase(speed: SpeedDescriptor) -> &'static str {
    match speed {
        SpeedDescriptor::SameDay => "for later today",
        SpeedDescriptor::NextDay => "for tomorrow",
        SpeedDescriptor::TwoToThreeDays => "within 2-3 days",
        SpeedDescriptor::PickupOnly => "at the collection site",
    }
}

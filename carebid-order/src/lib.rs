pub mod milestones;
pub mod models;
pub mod orchestrator;
pub mod simulation;

pub use milestones::{
    AdvanceContext, DeliveryMode, FulfillmentState, FulfillmentTrack, Milestone, Transition,
};
pub use models::{ClinicianContext, MedicationItem, Order, OrderCategory, OrderError, OrderItems, TestItem};
pub use orchestrator::{EngineConfig, OrderOrchestrator, SubmittedOrder};
pub use simulation::{FulfillmentSimulation, SimulationHandle, StatusUpdate, TimingPolicy};

mod app_config;

use carebid_catalog::ProviderDirectory;
use carebid_order::{
    ClinicianContext, MedicationItem, Order, OrderOrchestrator, SubmittedOrder, TestItem,
};
use carebid_shared::models::events::EngineEvent;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carebid_demo=info,carebid_order=info,carebid_offer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = app_config::AppConfig::load().expect("Failed to load config");
    info!("Starting carebid fulfillment demo");

    let directory = Arc::new(ProviderDirectory::with_demo_catalog());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<EngineEvent>();

    let mut orchestrator = OrderOrchestrator::new(directory, config.engine)
        .expect("Invalid engine configuration")
        .with_event_sink(event_tx);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "engine event");
        }
    });

    let clinician = ClinicianContext {
        clinician_name: "Dr. Adaeze Okafor".to_string(),
        patient_name: "Jamie Rivera".to_string(),
    };

    let pharmacy_order = Order::medication(
        vec![
            MedicationItem {
                name: "Lisinopril".to_string(),
                dosage: "10mg".to_string(),
                instructions: "Once daily in the morning".to_string(),
            },
            MedicationItem {
                name: "Atorvastatin".to_string(),
                dosage: "20mg".to_string(),
                instructions: "Once daily at bedtime".to_string(),
            },
        ],
        clinician.clone(),
    );

    let lab_order = Order::lab(
        vec![TestItem {
            name: "Comprehensive metabolic panel".to_string(),
            reason: "Hypertension follow-up".to_string(),
        }],
        clinician,
    );

    let pharmacy = orchestrator
        .submit(pharmacy_order)
        .await
        .expect("Pharmacy order submission failed");
    let lab = orchestrator
        .submit(lab_order)
        .await
        .expect("Lab order submission failed");

    // The two orders progress independently
    let pharmacy_task = tokio::spawn(watch_order("pharmacy", pharmacy));
    let lab_task = tokio::spawn(watch_order("lab", lab));
    let _ = tokio::join!(pharmacy_task, lab_task);

    info!("All orders reached a terminal state");
}

async fn watch_order(label: &'static str, mut submitted: SubmittedOrder) {
    for offer in &submitted.offers {
        info!(
            order = label,
            provider = %offer.provider_name,
            amount = offer.amount,
            speed = %offer.speed,
            score = offer.score.unwrap_or_default(),
            "ranked offer"
        );
    }

    match &submitted.winner {
        Some(winner) => info!(
            order = label,
            provider = %winner.provider_name,
            amount = winner.amount,
            "winner committed"
        ),
        None => {
            warn!(order = label, "no offers available, order cannot be fulfilled");
            return;
        }
    }

    while let Some(update) = submitted.statuses.recv().await {
        info!(
            order = label,
            milestone = update.milestone.name(),
            "{}",
            update.display_text
        );
        if update.is_terminal {
            break;
        }
    }
}

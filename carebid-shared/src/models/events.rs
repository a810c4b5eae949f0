use uuid::Uuid;

/// Emitted when an order's bid solicitation completes.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OffersSolicitedEvent {
    pub order_id: Uuid,
    pub offer_count: usize,
    pub timestamp: i64,
}

/// Emitted once per order when the scoring engine commits to a winner.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct WinnerSelectedEvent {
    pub order_id: Uuid,
    pub offer_id: Uuid,
    pub provider_name: String,
    pub amount: f64,
    pub score: f64,
    pub timestamp: i64,
}

/// Emitted on every fulfillment milestone change, including ABANDONED.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct FulfillmentAdvancedEvent {
    pub order_id: Uuid,
    pub milestone: String,
    pub is_terminal: bool,
    pub timestamp: i64,
}

/// Union of all engine events, for consumers that subscribe to one stream.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineEvent {
    OffersSolicited(OffersSolicitedEvent),
    WinnerSelected(WinnerSelectedEvent),
    FulfillmentAdvanced(FulfillmentAdvancedEvent),
}

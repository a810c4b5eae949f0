use crate::models::Offer;
use std::collections::HashMap;
use uuid::Uuid;

/// Per-session record of the bids solicited for each order.
///
/// Holds one offer set per order and a write-once winner, in memory only;
/// nothing here survives the session.
pub struct OfferBook {
    entries: HashMap<Uuid, OrderBids>,
}

struct OrderBids {
    offers: Vec<Offer>,
    winner_id: Option<Uuid>,
}

impl OfferBook {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Record the full offer set for an order. Each order is solicited
    /// exactly once.
    pub fn record(&mut self, order_id: Uuid, offers: Vec<Offer>) -> Result<(), OfferError> {
        if self.entries.contains_key(&order_id) {
            return Err(OfferError::AlreadySolicited(order_id.to_string()));
        }
        self.entries.insert(
            order_id,
            OrderBids {
                offers,
                winner_id: None,
            },
        );
        Ok(())
    }

    pub fn offers(&self, order_id: &Uuid) -> Option<&[Offer]> {
        self.entries.get(order_id).map(|bids| bids.offers.as_slice())
    }

    /// Commit the winning offer for an order. The winner is never
    /// re-chosen once set.
    pub fn set_winner(&mut self, order_id: Uuid, offer_id: Uuid) -> Result<(), OfferError> {
        let bids = self
            .entries
            .get_mut(&order_id)
            .ok_or_else(|| OfferError::UnknownOrder(order_id.to_string()))?;

        if bids.winner_id.is_some() {
            return Err(OfferError::WinnerAlreadySet(order_id.to_string()));
        }
        if !bids.offers.iter().any(|offer| offer.id == offer_id) {
            return Err(OfferError::UnknownOffer(offer_id.to_string()));
        }

        bids.winner_id = Some(offer_id);
        Ok(())
    }

    pub fn winner(&self, order_id: &Uuid) -> Option<&Offer> {
        let bids = self.entries.get(order_id)?;
        let winner_id = bids.winner_id?;
        bids.offers.iter().find(|offer| offer.id == winner_id)
    }
}

impl Default for OfferBook {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OfferError {
    #[error("Offers already solicited for order: {0}")]
    AlreadySolicited(String),

    #[error("No offers recorded for order: {0}")]
    UnknownOrder(String),

    #[error("Offer does not belong to order: {0}")]
    UnknownOffer(String),

    #[error("Winner already committed for order: {0}")]
    WinnerAlreadySet(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QualitySnapshot;
    use carebid_catalog::{QualityGrade, SpeedDescriptor};

    fn offer(order_id: Uuid) -> Offer {
        Offer::new(
            order_id,
            Uuid::new_v4(),
            "Test Pharmacy".to_string(),
            32.50,
            SpeedDescriptor::SameDay,
            QualitySnapshot {
                rating: 4.6,
                grade: QualityGrade::A,
            },
        )
    }

    #[test]
    fn test_winner_is_write_once() {
        let mut book = OfferBook::new();
        let order_id = Uuid::new_v4();
        let offers = vec![offer(order_id), offer(order_id)];
        let first_id = offers[0].id;
        let second_id = offers[1].id;

        book.record(order_id, offers).unwrap();
        book.set_winner(order_id, first_id).unwrap();
        assert_eq!(book.winner(&order_id).unwrap().id, first_id);

        let result = book.set_winner(order_id, second_id);
        assert!(matches!(result, Err(OfferError::WinnerAlreadySet(_))));
        assert_eq!(book.winner(&order_id).unwrap().id, first_id);
    }

    #[test]
    fn test_each_order_is_solicited_once() {
        let mut book = OfferBook::new();
        let order_id = Uuid::new_v4();

        book.record(order_id, vec![offer(order_id)]).unwrap();
        let result = book.record(order_id, vec![offer(order_id)]);
        assert!(matches!(result, Err(OfferError::AlreadySolicited(_))));
    }

    #[test]
    fn test_winner_must_belong_to_order() {
        let mut book = OfferBook::new();
        let order_id = Uuid::new_v4();
        book.record(order_id, vec![offer(order_id)]).unwrap();

        let foreign = Uuid::new_v4();
        assert!(matches!(
            book.set_winner(order_id, foreign),
            Err(OfferError::UnknownOffer(_))
        ));
        assert!(matches!(
            book.set_winner(Uuid::new_v4(), foreign),
            Err(OfferError::UnknownOrder(_))
        ));
    }
}

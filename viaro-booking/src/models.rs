use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use viaro_core::search::SearchCriteria;
use viaro_offer::models::Offering;

/// Booking stages in forward order. Submission is not a stage of its own;
/// a successful submit lands the traveler back on the offering list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStage {
    SelectBus,
    PassengerDetails,
    SeatSelection,
    Summary,
}

impl BookingStage {
    /// One step back; the first stage holds its ground.
    pub fn previous(self) -> BookingStage {
        match self {
            BookingStage::SelectBus => BookingStage::SelectBus,
            BookingStage::PassengerDetails => BookingStage::SelectBus,
            BookingStage::SeatSelection => BookingStage::PassengerDetails,
            BookingStage::Summary => BookingStage::SeatSelection,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// One traveler on the roster. Fresh records start blank and the form fills
/// them in field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    pub name: String,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Everything the summary screen shows, frozen at the moment the traveler
/// entered it. Rebuilt on every entry, so edits behind it can never leak in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub criteria: SearchCriteria,
    pub offering: Offering,
    pub passengers: Vec<PassengerRecord>,
    pub seats: Vec<i32>,
    pub total_amount: i32,
    pub created_at: DateTime<Utc>,
}

impl BookingDraft {
    pub fn new(
        customer_id: Uuid,
        criteria: SearchCriteria,
        offering: Offering,
        passengers: Vec<PassengerRecord>,
        seats: Vec<i32>,
        total_amount: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            criteria,
            offering,
            passengers,
            seats,
            total_amount,
            created_at: Utc::now(),
        }
    }
}

/// Receipt handed back by the ledger once a draft is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_reference: String,
    pub booked_at: DateTime<Utc>,
    pub total_amount: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_stage_chain() {
        assert_eq!(BookingStage::Summary.previous(), BookingStage::SeatSelection);
        assert_eq!(
            BookingStage::SeatSelection.previous(),
            BookingStage::PassengerDetails
        );
        assert_eq!(
            BookingStage::PassengerDetails.previous(),
            BookingStage::SelectBus
        );
        assert_eq!(BookingStage::SelectBus.previous(), BookingStage::SelectBus);
    }

    #[test]
    fn test_blank_passenger_record() {
        let record = PassengerRecord::default();
        assert!(record.name.is_empty());
        assert!(record.age.is_none());
        assert!(record.gender.is_none());
    }
}

use crate::models::{BookingConfirmation, BookingDraft};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerStatus {
    Confirmed,
    Cancelled,
}

/// One recorded booking as the ledger reports it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub booking_reference: String,
    pub customer_id: Uuid,
    pub operator_name: String,
    pub seats: Vec<i32>,
    pub total_amount: i32,
    pub booked_at: DateTime<Utc>,
    pub status: LedgerStatus,
}

/// Server-side booking record. Submission is not idempotent; retrying a
/// failed draft is the caller's decision.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    async fn submit_booking(&self, draft: &BookingDraft)
        -> Result<BookingConfirmation, LedgerError>;

    /// Every booking recorded for one traveler, newest last.
    async fn list_bookings(&self, customer_id: Uuid) -> Result<Vec<LedgerEntry>, LedgerError>;

    async fn cancel_booking(&self, booking_reference: &str) -> Result<(), LedgerError>;
}

/// Ledger backed by process memory, with a one-shot failure trigger for
/// exercising the retry path.
pub struct InMemoryBookingLedger {
    entries: Mutex<Vec<LedgerEntry>>,
    fail_next: AtomicBool,
}

impl InMemoryBookingLedger {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Arm the ledger to reject exactly one upcoming submission.
    pub fn fail_next_submission(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn lock_entries(&self) -> MutexGuard<'_, Vec<LedgerEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryBookingLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingLedger for InMemoryBookingLedger {
    async fn submit_booking(
        &self,
        draft: &BookingDraft,
    ) -> Result<BookingConfirmation, LedgerError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(LedgerError::Unavailable(
                "Simulated ledger outage".to_string(),
            ));
        }

        let booked_at = Utc::now();
        let reference = format!(
            "VRO-{}-{}",
            booked_at.timestamp(),
            &draft.id.simple().to_string()[..8].to_uppercase()
        );
        tracing::info!("Recording booking {} for {}", reference, draft.customer_id);

        self.lock_entries().push(LedgerEntry {
            booking_reference: reference.clone(),
            customer_id: draft.customer_id,
            operator_name: draft.offering.operator_name.clone(),
            seats: draft.seats.clone(),
            total_amount: draft.total_amount,
            booked_at,
            status: LedgerStatus::Confirmed,
        });

        Ok(BookingConfirmation {
            booking_reference: reference,
            booked_at,
            total_amount: draft.total_amount,
        })
    }

    async fn list_bookings(&self, customer_id: Uuid) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self
            .lock_entries()
            .iter()
            .filter(|entry| entry.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn cancel_booking(&self, booking_reference: &str) -> Result<(), LedgerError> {
        let mut entries = self.lock_entries();
        let entry = entries
            .iter_mut()
            .find(|entry| entry.booking_reference == booking_reference)
            .ok_or_else(|| LedgerError::NotFound(booking_reference.to_string()))?;

        if entry.status == LedgerStatus::Cancelled {
            return Err(LedgerError::AlreadyCancelled(booking_reference.to_string()));
        }
        entry.status = LedgerStatus::Cancelled;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Booking ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Booking already cancelled: {0}")]
    AlreadyCancelled(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::BTreeSet;
    use viaro_core::search::SearchCriteria;
    use viaro_offer::models::Offering;

    fn sample_draft(customer_id: Uuid) -> BookingDraft {
        let criteria = SearchCriteria::one_way(
            "Delhi".to_string(),
            "Jaipur".to_string(),
            NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            2,
        );
        let offering = Offering {
            id: Uuid::new_v4(),
            operator_name: "Orange Tours".to_string(),
            vehicle_class: "AC Sleeper".to_string(),
            departure_time: NaiveTime::from_hms_opt(21, 30, 0).unwrap(),
            arrival_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            duration_label: "8h 30m".to_string(),
            unit_price: 700,
            available_seat_count: 28,
            rating_score: 4.3,
            amenities: BTreeSet::new(),
            cancellation_policy: "Free cancellation until 12h before departure".to_string(),
            highlight_tag: None,
        };
        BookingDraft::new(customer_id, criteria, offering, vec![], vec![7, 12], 1682)
    }

    #[tokio::test]
    async fn test_submit_and_list() {
        let ledger = InMemoryBookingLedger::new();
        let customer_id = Uuid::new_v4();

        let confirmation = ledger.submit_booking(&sample_draft(customer_id)).await.unwrap();
        assert!(confirmation.booking_reference.starts_with("VRO-"));
        assert_eq!(confirmation.total_amount, 1682);

        let bookings = ledger.list_bookings(customer_id).await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].status, LedgerStatus::Confirmed);
        assert_eq!(bookings[0].seats, vec![7, 12]);

        let other = ledger.list_bookings(Uuid::new_v4()).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_armed_failure_rejects_once() {
        let ledger = InMemoryBookingLedger::new();
        let customer_id = Uuid::new_v4();
        ledger.fail_next_submission();

        let first = ledger.submit_booking(&sample_draft(customer_id)).await;
        assert!(matches!(first, Err(LedgerError::Unavailable(_))));

        let retry = ledger.submit_booking(&sample_draft(customer_id)).await;
        assert!(retry.is_ok(), "the trigger only fires once");
    }

    #[tokio::test]
    async fn test_cancel_lifecycle() {
        let ledger = InMemoryBookingLedger::new();
        let customer_id = Uuid::new_v4();
        let confirmation = ledger.submit_booking(&sample_draft(customer_id)).await.unwrap();

        ledger
            .cancel_booking(&confirmation.booking_reference)
            .await
            .unwrap();
        let bookings = ledger.list_bookings(customer_id).await.unwrap();
        assert_eq!(bookings[0].status, LedgerStatus::Cancelled);

        let again = ledger.cancel_booking(&confirmation.booking_reference).await;
        assert!(matches!(again, Err(LedgerError::AlreadyCancelled(_))));

        let missing = ledger.cancel_booking("VRO-0-DEADBEEF").await;
        assert!(matches!(missing, Err(LedgerError::NotFound(_))));
    }
}

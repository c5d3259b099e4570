use crate::fare::{FareBreakdown, FareConfig, FareEngine};
use crate::ledger::{BookingLedger, LedgerError};
use crate::models::{BookingConfirmation, BookingDraft, BookingStage};
use crate::roster::{PassengerField, PassengerRoster, RosterError};
use crate::seatmap::{SeatMap, SeatMapError, SeatToggle};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use viaro_core::identity::{AuthSession, UserProfile};
use viaro_core::search::{SearchCriteria, SearchError};
use viaro_offer::models::Offering;
use viaro_offer::provider::OfferingProvider;

/// Criteria and the catalog they produced, kept together so one can never
/// outlive the other.
struct ActiveSearch {
    criteria: SearchCriteria,
    offerings: Vec<Offering>,
}

/// Drives one traveler's session from search to submission.
///
/// The workflow owns all in-progress booking state and is the only writer of
/// it. Collaborators are reached through the injected traits; the UI reads
/// state back through the accessors and renders whatever stage says.
pub struct BookingWorkflow {
    auth: Arc<dyn AuthSession>,
    provider: Arc<dyn OfferingProvider>,
    ledger: Arc<dyn BookingLedger>,
    fare: FareEngine,

    stage: BookingStage,
    customer: Option<UserProfile>,
    search: Option<ActiveSearch>,
    selected_offering: Option<Offering>,
    roster: Option<PassengerRoster>,
    seat_map: Option<SeatMap>,
    draft: Option<BookingDraft>,
    submitting: bool,
    last_confirmation: Option<BookingConfirmation>,
    notices: HashMap<BookingStage, Vec<String>>,
}

impl BookingWorkflow {
    pub fn new(
        auth: Arc<dyn AuthSession>,
        provider: Arc<dyn OfferingProvider>,
        ledger: Arc<dyn BookingLedger>,
        fare_config: FareConfig,
    ) -> Self {
        Self {
            auth,
            provider,
            ledger,
            fare: FareEngine::new(fare_config),
            stage: BookingStage::SelectBus,
            customer: None,
            search: None,
            selected_offering: None,
            roster: None,
            seat_map: None,
            draft: None,
            submitting: false,
            last_confirmation: None,
            notices: HashMap::new(),
        }
    }

    /// Validate the criteria and fetch a fresh catalog. Refused outright
    /// without a live session; a provider failure keeps the criteria so the
    /// traveler can retry from where they stand.
    pub async fn begin_search(&mut self, criteria: SearchCriteria) -> Result<(), WorkflowError> {
        let Some(user) = self.authenticated_user() else {
            return Err(self.refuse_unauthenticated());
        };
        criteria.validate()?;

        self.reset_session_state();
        self.customer = Some(user);

        let offerings = match self.provider.generate_offerings(&criteria).await {
            Ok(offerings) => offerings,
            Err(err) => {
                tracing::warn!("Offering generation failed: {}", err);
                self.push_notice(
                    BookingStage::SelectBus,
                    "Could not load bus offerings. Please retry the search.",
                );
                self.search = Some(ActiveSearch {
                    criteria,
                    offerings: Vec::new(),
                });
                return Err(WorkflowError::OfferingsUnavailable(err.to_string()));
            }
        };

        tracing::info!(
            "Search {} -> {} produced {} offerings",
            criteria.origin_name,
            criteria.destination_name,
            offerings.len()
        );
        self.search = Some(ActiveSearch {
            criteria,
            offerings,
        });
        Ok(())
    }

    /// Commit to one offering and open the passenger form. The session is
    /// re-checked here; a login that expired while browsing throws the
    /// traveler back to the start.
    pub fn select_offering(&mut self, offering_id: Uuid) -> Result<(), WorkflowError> {
        if self.stage != BookingStage::SelectBus {
            return Err(WorkflowError::InvalidTransition {
                from: self.stage,
                to: BookingStage::PassengerDetails,
            });
        }
        let Some(user) = self.authenticated_user() else {
            return Err(self.refuse_unauthenticated());
        };

        let (offering, capacity) = {
            let Some(search) = self.search.as_ref() else {
                return Err(WorkflowError::OfferingNotFound(offering_id));
            };
            let offering = search
                .offerings
                .iter()
                .find(|offering| offering.id == offering_id)
                .cloned()
                .ok_or(WorkflowError::OfferingNotFound(offering_id))?;
            (offering, search.criteria.passenger_count as usize)
        };

        tracing::info!(
            "Offering {} selected; roster opens with {} travelers",
            offering.label(),
            capacity
        );
        // Always a fresh roster and seat map, even when re-selecting the
        // same offering after going back.
        self.customer = Some(user);
        self.roster = Some(PassengerRoster::blank(capacity));
        self.seat_map = Some(SeatMap::for_offering(&offering, capacity));
        self.selected_offering = Some(offering);
        self.draft = None;
        self.stage = BookingStage::PassengerDetails;
        Ok(())
    }

    /// Append a blank traveler; the seat requirement and the criteria's
    /// passenger count follow the roster. Returns false when the roster is
    /// already at its upper bound.
    pub fn add_passenger(&mut self) -> Result<bool, WorkflowError> {
        self.ensure_stage(BookingStage::PassengerDetails)?;
        let Some(roster) = self.roster.as_mut() else {
            return Err(WorkflowError::WrongStage { stage: self.stage });
        };
        let grew = roster.add_passenger();
        if grew {
            self.sync_roster_size();
        }
        Ok(grew)
    }

    /// Drop the traveler at `index`; picks beyond the smaller seat
    /// requirement are released. Returns false for the last traveler or an
    /// out-of-bounds index.
    pub fn remove_passenger(&mut self, index: usize) -> Result<bool, WorkflowError> {
        self.ensure_stage(BookingStage::PassengerDetails)?;
        let Some(roster) = self.roster.as_mut() else {
            return Err(WorkflowError::WrongStage { stage: self.stage });
        };
        let shrank = roster.remove_passenger(index);
        if shrank {
            self.sync_roster_size();
        }
        Ok(shrank)
    }

    pub fn update_passenger(
        &mut self,
        index: usize,
        field: PassengerField,
    ) -> Result<(), WorkflowError> {
        self.ensure_stage(BookingStage::PassengerDetails)?;
        let Some(roster) = self.roster.as_mut() else {
            return Err(WorkflowError::WrongStage { stage: self.stage });
        };
        roster.update_field(index, field)?;
        Ok(())
    }

    /// Advance to seat selection. Every roster record must validate first.
    pub fn proceed_to_seats(&mut self) -> Result<(), WorkflowError> {
        if self.stage != BookingStage::PassengerDetails {
            return Err(WorkflowError::InvalidTransition {
                from: self.stage,
                to: BookingStage::SeatSelection,
            });
        }
        let Some(roster) = self.roster.as_ref() else {
            return Err(WorkflowError::WrongStage { stage: self.stage });
        };
        if let Err(err) = roster.validate() {
            self.push_notice(BookingStage::PassengerDetails, err.to_string());
            return Err(err.into());
        }
        self.stage = BookingStage::SeatSelection;
        Ok(())
    }

    /// Flip one seat. Booked seats are inert; picking past the roster size
    /// surfaces a notice and leaves the selection unchanged.
    pub fn toggle_seat(&mut self, seat: i32) -> Result<SeatToggle, WorkflowError> {
        self.ensure_stage(BookingStage::SeatSelection)?;
        let Some(map) = self.seat_map.as_mut() else {
            return Err(WorkflowError::WrongStage { stage: self.stage });
        };
        match map.toggle(seat) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if matches!(err, SeatMapError::SelectionLimitReached { .. }) {
                    self.push_notice(BookingStage::SeatSelection, err.to_string());
                }
                Err(err.into())
            }
        }
    }

    /// Advance to the summary. Requires exactly one seat per traveler and
    /// freezes a fresh draft for the screen to show.
    pub fn proceed_to_summary(&mut self) -> Result<(), WorkflowError> {
        if self.stage != BookingStage::SeatSelection {
            return Err(WorkflowError::InvalidTransition {
                from: self.stage,
                to: BookingStage::Summary,
            });
        }
        let draft = match self.assemble_draft() {
            Ok(draft) => draft,
            Err(err) => {
                if matches!(err, WorkflowError::SeatCountMismatch { .. }) {
                    self.push_notice(BookingStage::SeatSelection, err.to_string());
                }
                return Err(err);
            }
        };
        self.draft = Some(draft);
        self.stage = BookingStage::Summary;
        Ok(())
    }

    /// Step back one stage, keeping everything entered so far. The summary
    /// draft is dropped; it is rebuilt on every entry.
    pub fn go_back(&mut self) -> BookingStage {
        let previous = self.stage.previous();
        if previous != self.stage {
            tracing::info!("Navigating back from {:?} to {:?}", self.stage, previous);
        }
        self.stage = previous;
        self.submitting = false;
        self.draft = None;
        self.stage
    }

    /// Hand the draft to the ledger. Success resets the booking state and
    /// returns the traveler to the offering list; failure keeps the draft so
    /// submit can simply be called again.
    pub async fn submit(&mut self) -> Result<BookingConfirmation, WorkflowError> {
        self.ensure_stage(BookingStage::Summary)?;
        if self.submitting {
            return Err(WorkflowError::SubmissionInFlight);
        }

        // Last full sweep over the roster before anything leaves the session.
        if let Some(err) = self.roster.as_ref().and_then(|roster| roster.validate().err()) {
            self.push_notice(BookingStage::Summary, err.to_string());
            return Err(err.into());
        }
        let draft = match self.assemble_draft() {
            Ok(draft) => draft,
            Err(err) => {
                self.push_notice(BookingStage::Summary, err.to_string());
                return Err(err);
            }
        };
        self.draft = Some(draft.clone());

        self.submitting = true;
        tracing::info!(
            "Submitting booking draft {} ({} travelers, total {})",
            draft.id,
            draft.passengers.len(),
            draft.total_amount
        );
        let outcome = self.ledger.submit_booking(&draft).await;
        self.submitting = false;

        match outcome {
            Ok(confirmation) => {
                tracing::info!("Booking confirmed: {}", confirmation.booking_reference);
                self.finish_submission();
                self.last_confirmation = Some(confirmation.clone());
                Ok(confirmation)
            }
            Err(err) => {
                tracing::error!("Booking submission failed: {}", err);
                self.push_notice(BookingStage::Summary, "Booking failed. Please try again.");
                Err(WorkflowError::SubmissionFailed(err))
            }
        }
    }

    pub fn stage(&self) -> BookingStage {
        self.stage
    }

    pub fn criteria(&self) -> Option<&SearchCriteria> {
        self.search.as_ref().map(|search| &search.criteria)
    }

    pub fn offerings(&self) -> &[Offering] {
        self.search
            .as_ref()
            .map(|search| search.offerings.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_offering(&self) -> Option<&Offering> {
        self.selected_offering.as_ref()
    }

    pub fn roster(&self) -> Option<&PassengerRoster> {
        self.roster.as_ref()
    }

    pub fn seat_map(&self) -> Option<&SeatMap> {
        self.seat_map.as_ref()
    }

    pub fn draft(&self) -> Option<&BookingDraft> {
        self.draft.as_ref()
    }

    /// Live fare preview; available from offering selection onwards.
    pub fn fare_breakdown(&self) -> Option<FareBreakdown> {
        let offering = self.selected_offering.as_ref()?;
        let roster = self.roster.as_ref()?;
        Some(self.fare.breakdown(offering.unit_price, roster.len() as u32))
    }

    pub fn total_due(&self) -> Option<i32> {
        self.fare_breakdown().map(|breakdown| breakdown.total)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn last_confirmation(&self) -> Option<&BookingConfirmation> {
        self.last_confirmation.as_ref()
    }

    pub fn notices(&self, stage: BookingStage) -> &[String] {
        self.notices
            .get(&stage)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Drain the notices for one stage, typically after the UI showed them.
    pub fn take_notices(&mut self, stage: BookingStage) -> Vec<String> {
        self.notices.remove(&stage).unwrap_or_default()
    }

    fn ensure_stage(&self, expected: BookingStage) -> Result<(), WorkflowError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(WorkflowError::WrongStage { stage: self.stage })
        }
    }

    /// The roster length is the passenger count: the seat requirement and
    /// the criteria stay in lockstep with every growth or shrink.
    fn sync_roster_size(&mut self) {
        let Some(count) = self.roster.as_ref().map(PassengerRoster::len) else {
            return;
        };
        if let Some(map) = self.seat_map.as_mut() {
            map.set_capacity(count);
        }
        if let Some(search) = self.search.as_mut() {
            search.criteria.passenger_count = count as u32;
        }
    }

    /// A live session must also expose a profile; a half-open session is
    /// treated as unauthenticated.
    fn authenticated_user(&self) -> Option<UserProfile> {
        if !self.auth.is_authenticated() {
            return None;
        }
        self.auth.current_user()
    }

    fn refuse_unauthenticated(&mut self) -> WorkflowError {
        tracing::warn!("Refusing action: no authenticated session");
        self.reset_session_state();
        self.auth.request_login_redirect();
        WorkflowError::AuthenticationRequired
    }

    fn reset_session_state(&mut self) {
        self.stage = BookingStage::SelectBus;
        self.customer = None;
        self.search = None;
        self.selected_offering = None;
        self.roster = None;
        self.seat_map = None;
        self.draft = None;
        self.submitting = false;
        self.notices.clear();
    }

    /// After a confirmed booking: back to the offering list with the search
    /// intact, everything offering-specific gone.
    fn finish_submission(&mut self) {
        self.stage = BookingStage::SelectBus;
        self.selected_offering = None;
        self.roster = None;
        self.seat_map = None;
        self.draft = None;
        self.notices.clear();
    }

    fn assemble_draft(&self) -> Result<BookingDraft, WorkflowError> {
        let (Some(search), Some(offering), Some(roster), Some(map), Some(customer)) = (
            self.search.as_ref(),
            self.selected_offering.as_ref(),
            self.roster.as_ref(),
            self.seat_map.as_ref(),
            self.customer.as_ref(),
        ) else {
            return Err(WorkflowError::WrongStage { stage: self.stage });
        };

        let required = roster.len();
        let selected = map.selected();
        if selected.len() != required {
            return Err(WorkflowError::SeatCountMismatch {
                selected: selected.len(),
                required,
            });
        }

        let breakdown = self.fare.breakdown(offering.unit_price, required as u32);
        Ok(BookingDraft::new(
            customer.id,
            search.criteria.clone(),
            offering.clone(),
            roster.passengers().to_vec(),
            selected.to_vec(),
            breakdown.total,
        ))
    }

    fn push_notice(&mut self, stage: BookingStage, message: impl Into<String>) {
        self.notices.entry(stage).or_default().push(message.into());
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid stage transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: BookingStage,
        to: BookingStage,
    },

    #[error("Action not available in stage {stage:?}")]
    WrongStage { stage: BookingStage },

    #[error("Search validation failed: {0}")]
    InvalidCriteria(#[from] SearchError),

    #[error("Offerings unavailable: {0}")]
    OfferingsUnavailable(String),

    #[error("Offering not found: {0}")]
    OfferingNotFound(Uuid),

    #[error("Passenger validation failed: {0}")]
    InvalidRoster(#[from] RosterError),

    #[error("Seat selection failed: {0}")]
    SeatRejected(#[from] SeatMapError),

    #[error("Seat selection incomplete: {selected} of {required} seats chosen")]
    SeatCountMismatch { selected: usize, required: usize },

    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("Booking submission failed")]
    SubmissionFailed(#[source] LedgerError),
}

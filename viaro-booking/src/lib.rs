pub mod fare;
pub mod ledger;
pub mod models;
pub mod roster;
pub mod seatmap;
pub mod workflow;

pub use fare::{FareBreakdown, FareConfig, FareEngine};
pub use ledger::{BookingLedger, InMemoryBookingLedger, LedgerEntry, LedgerError, LedgerStatus};
pub use models::{BookingConfirmation, BookingDraft, BookingStage, Gender, PassengerRecord};
pub use roster::{PassengerField, PassengerRoster, RosterError};
pub use seatmap::{SeatMap, SeatMapError, SeatToggle, TOTAL_SEATS};
pub use workflow::{BookingWorkflow, WorkflowError};

pub mod models;
pub mod provider;
pub mod synthetic;

pub use models::Offering;
pub use provider::{OfferingError, OfferingProvider};
pub use synthetic::{SyntheticConfig, SyntheticOfferingProvider};

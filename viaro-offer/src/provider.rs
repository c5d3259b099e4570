use crate::models::Offering;
use async_trait::async_trait;
use viaro_core::search::SearchCriteria;

/// Source of bookable offerings for a validated search. The workflow only
/// depends on this trait, so the synthetic catalog can be swapped for a live
/// inventory service without touching the booking stages.
#[async_trait]
pub trait OfferingProvider: Send + Sync {
    async fn generate_offerings(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Offering>, OfferingError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OfferingError {
    #[error("Offering source unavailable: {0}")]
    Unavailable(String),

    #[error("Offering generation failed: {0}")]
    GenerationFailed(String),
}

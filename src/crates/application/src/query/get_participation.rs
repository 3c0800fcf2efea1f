use crate::error::AppError;
use domain::participation::ParticipationService;
use domain::value::{EventId, ParticipantId};
use model::participation::ModelParticipation;
use std::sync::Arc;

#[derive(Clone)]
pub struct GetParticipation {
    service: Arc<ParticipationService>,
}

impl GetParticipation {
    pub fn new(service: Arc<ParticipationService>) -> Self {
        Self { service }
    }

    pub async fn handle(
        &self,
        participant_id: i64,
        event_id: i64,
    ) -> Result<ModelParticipation, AppError> {
        let participation = self
            .service
            .load(ParticipantId::from(participant_id), EventId::from(event_id))
            .await?;
        Ok(ModelParticipation::from(participation.to_model()))
    }
}

use domain::participation::ParticipationRecord;
use serde::{Deserialize, Serialize};

/// 参与记录读模型，字段名与 ob_participation 表保持一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParticipation {
    pub id: i64,
    pub id_participant: i64,
    pub id_event: i64,
    pub comments: String,
    pub cancelled: bool,
    pub present: bool,
}

impl From<&ParticipationRecord> for ModelParticipation {
    fn from(record: &ParticipationRecord) -> Self {
        Self {
            id: record.id.as_i64(),
            id_participant: record.participant_id.as_i64(),
            id_event: record.event_id.as_i64(),
            comments: record.comments.clone(),
            cancelled: record.cancelled,
            present: record.present,
        }
    }
}

impl From<ParticipationRecord> for ModelParticipation {
    fn from(record: ParticipationRecord) -> Self {
        Self::from(&record)
    }
}

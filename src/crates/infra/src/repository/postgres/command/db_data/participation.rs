use domain::participation::ParticipationRecord;
use domain::value::{EventId, ParticipantId, ParticipationId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, DeriveEntityModel, Default)]
#[sea_orm(table_name = "ob_participation")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[sea_orm(column_type = "BigInteger")]
    pub id: i64,
    #[sea_orm(column_type = "BigInteger")]
    pub id_participant: i64,
    #[sea_orm(column_type = "BigInteger")]
    pub id_event: i64,
    #[sea_orm(column_type = "Text")]
    pub comments: String,
    pub cancelled: bool,
    pub present: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ParticipationRecord {
    fn from(model: Model) -> Self {
        Self {
            id: ParticipationId::from(model.id),
            participant_id: ParticipantId::from(model.id_participant),
            event_id: EventId::from(model.id_event),
            comments: model.comments,
            cancelled: model.cancelled,
            present: model.present,
        }
    }
}

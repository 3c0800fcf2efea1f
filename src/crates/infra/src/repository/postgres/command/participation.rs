use super::db_data::participation::{ActiveModel, Column, Entity};
use async_trait::async_trait;
use domain::participation::{
    ParticipationError, ParticipationRecord, ParticipationRepository, Result, WriteOutcome,
};
use domain::value::{EventId, ParticipantId, ParticipationId};
use log::error;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Value};

/// 将驱动错误归入领域错误类别
///
/// 连接与语句执行错误保留原始信息，其余错误（类型转换等）不携带细节。
pub(crate) fn map_db_err(err: DbErr) -> ParticipationError {
    match &err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) | DbErr::Exec(_) | DbErr::Query(_) => {
            ParticipationError::StoreError(err.to_string())
        }
        _ => {
            error!("unexpected database error: {}", err);
            ParticipationError::UnknownError
        }
    }
}

pub struct ParticipationRepositoryImpl {
    db: DatabaseConnection,
}

impl ParticipationRepositoryImpl {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn update_column(
        &self,
        id: ParticipationId,
        column: Column,
        value: Value,
    ) -> Result<WriteOutcome> {
        Entity::update_many()
            .col_expr(column, Expr::value(value))
            .filter(Column::Id.eq(id.as_i64()))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(WriteOutcome::written())
    }
}

#[async_trait]
impl ParticipationRepository for ParticipationRepositoryImpl {
    async fn find_by_participant_and_event(
        &self,
        participant_id: ParticipantId,
        event_id: EventId,
    ) -> Result<Option<ParticipationRecord>> {
        let row = Entity::find()
            .filter(Column::IdParticipant.eq(participant_id.as_i64()))
            .filter(Column::IdEvent.eq(event_id.as_i64()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(ParticipationRecord::from))
    }

    async fn update_present(&self, id: ParticipationId, present: bool) -> Result<WriteOutcome> {
        self.update_column(id, Column::Present, present.into()).await
    }

    async fn update_cancelled(&self, id: ParticipationId, cancelled: bool) -> Result<WriteOutcome> {
        self.update_column(id, Column::Cancelled, cancelled.into()).await
    }

    async fn update_comments(&self, id: ParticipationId, comments: &str) -> Result<WriteOutcome> {
        self.update_column(id, Column::Comments, comments.into()).await
    }

    async fn insert(&self, participant_id: ParticipantId, event_id: EventId) -> Result<WriteOutcome> {
        let active_model = ActiveModel {
            id: NotSet,
            id_participant: Set(participant_id.as_i64()),
            id_event: Set(event_id.as_i64()),
            comments: Set(String::new()),
            cancelled: Set(false),
            present: Set(false),
        };
        match Entity::insert(active_model).exec(&self.db).await {
            Ok(result) => Ok(WriteOutcome::inserted(ParticipationId::from(
                result.last_insert_id,
            ))),
            Err(DbErr::RecordNotInserted) => Ok(WriteOutcome::not_written()),
            Err(e) => Err(map_db_err(e)),
        }
    }
}

use crate::error::AppError;
use domain::participation::{
    AddOutcome, Event, Participant, ParticipationError, ParticipationService,
};
use domain::value::{EventId, LegacyFlag, ParticipantId};
use log::info;
use std::sync::Arc;

/// 旧接口提交的布尔标记，整数或字符串形式
#[derive(Debug, Clone, PartialEq)]
pub enum FlagInput {
    Integer(i64),
    Text(String),
    Bool(bool),
}

impl FlagInput {
    fn parse(&self, field: &str) -> Result<bool, ParticipationError> {
        let parsed = match self {
            FlagInput::Integer(raw) => LegacyFlag::try_from(*raw),
            FlagInput::Text(raw) => raw.parse::<LegacyFlag>(),
            FlagInput::Bool(value) => Ok(LegacyFlag::from(*value)),
        };
        parsed.map(bool::from).map_err(|_| {
            ParticipationError::InvalidInput(format!("Data {} is not valid. Boolean expected", field))
        })
    }
}

/// 标记到场命令
pub struct MarkPresenceCmd {
    pub participant_id: i64,
    pub event_id: i64,
    pub present: FlagInput,
}

/// 取消/恢复参与命令
pub struct SetCancelledCmd {
    pub participant_id: i64,
    pub event_id: i64,
    pub cancelled: FlagInput,
}

/// 修改备注命令
pub struct UpdateCommentsCmd {
    pub participant_id: i64,
    pub event_id: i64,
    pub comments: String,
}

/// 参与记录应用服务
pub struct ParticipationAppService {
    service: Arc<ParticipationService>,
}

impl ParticipationAppService {
    pub fn new(service: Arc<ParticipationService>) -> Self {
        Self { service }
    }

    /// 记录到场情况；标记值在访问存储之前校验
    pub async fn mark_presence(&self, cmd: MarkPresenceCmd) -> Result<(), AppError> {
        let present = cmd.present.parse("present")?;
        let mut participation = self
            .service
            .load(
                ParticipantId::from(cmd.participant_id),
                EventId::from(cmd.event_id),
            )
            .await?;
        participation.set_present(present).await?;
        info!(
            "participation {} present set to {}",
            participation.id(),
            present
        );
        Ok(())
    }

    pub async fn set_cancelled(&self, cmd: SetCancelledCmd) -> Result<(), AppError> {
        let cancelled = cmd.cancelled.parse("cancelled")?;
        let mut participation = self
            .service
            .load(
                ParticipantId::from(cmd.participant_id),
                EventId::from(cmd.event_id),
            )
            .await?;
        participation.set_cancelled(cancelled).await?;
        info!(
            "participation {} cancelled set to {}",
            participation.id(),
            cancelled
        );
        Ok(())
    }

    pub async fn update_comments(&self, cmd: UpdateCommentsCmd) -> Result<(), AppError> {
        let mut participation = self
            .service
            .load(
                ParticipantId::from(cmd.participant_id),
                EventId::from(cmd.event_id),
            )
            .await?;
        participation.set_comments(&cmd.comments).await?;
        Ok(())
    }

    /// 报名活动，`force_creation` 仅限管理员使用
    pub async fn add_participation(
        &self,
        participant: &dyn Participant,
        event: &dyn Event,
        force_creation: bool,
    ) -> Result<AddOutcome, AppError> {
        let outcome = self.service.add(participant, event, force_creation).await?;
        info!(
            "participant {} registered to event {}{}",
            participant.id(),
            event.id(),
            if force_creation { " (forced)" } else { "" }
        );
        Ok(outcome)
    }
}

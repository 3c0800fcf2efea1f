use async_trait::async_trait;
use domain::participation::ParticipationNotifier;
use domain::value::{EventId, ParticipantId};
use log::info;

/// 只记录日志的通知实现，尚未接入邮件发送
#[derive(Debug, Clone, Default)]
pub struct LogParticipationNotifier;

#[async_trait]
impl ParticipationNotifier for LogParticipationNotifier {
    async fn participation_created(
        &self,
        participant_id: ParticipantId,
        event_id: EventId,
    ) -> anyhow::Result<()> {
        info!(
            "participation created for participant {} on event {}, no mail transport configured",
            participant_id, event_id
        );
        Ok(())
    }
}

use super::value::{EventId, ParticipantId, ParticipationId};
use async_trait::async_trait;
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// 参与者被封禁时的状态值
pub const BANNED_STATUS: &str = "ban";

/// 拒绝访问的固定类别
///
/// 查不到参与记录与无权查看不做区分，统一归为 `NoParticipation`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoParticipation,
    Banned,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NoParticipation => write!(f, "no participation for this participant and event"),
            DenyReason::Banned => write!(f, "User ban, please contact the organizer"),
        }
    }
}

/// 参与记录领域错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParticipationError {
    #[error("Access denied: {0}")]
    AccessDenied(DenyReason),
    #[error("SQL error: {0}")]
    StoreError(String),
    #[error("Unknown error")]
    UnknownError,
    #[error("Invalid data: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, ParticipationError>;

/// 参与记录，对应 ob_participation 表的一行
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipationRecord {
    pub id: ParticipationId,            // 由存储分配，创建后不再变化
    pub participant_id: ParticipantId,  // 参与者ID
    pub event_id: EventId,              // 活动ID
    pub comments: String,               // 备注
    pub cancelled: bool,                // true 表示参与者已退出
    pub present: bool,                  // true 表示参与者实际到场
}

/// 写操作结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub success: bool,
    pub inserted_id: Option<ParticipationId>,
}

impl WriteOutcome {
    pub fn written() -> Self {
        Self {
            success: true,
            inserted_id: None,
        }
    }

    pub fn inserted(id: ParticipationId) -> Self {
        Self {
            success: true,
            inserted_id: Some(id),
        }
    }

    /// 存储未报错但也未执行写入
    pub fn not_written() -> Self {
        Self {
            success: false,
            inserted_id: None,
        }
    }
}

/// 参与记录仓储接口
///
/// 每个方法对应一次存储往返。更新语句不带版本条件，后写者覆盖先写者。
/// (participant, event) 的唯一性由存储保证，插入前不做重复检查。
#[async_trait]
pub trait ParticipationRepository: Send + Sync {
    async fn find_by_participant_and_event(
        &self,
        participant_id: ParticipantId,
        event_id: EventId,
    ) -> Result<Option<ParticipationRecord>>;

    async fn update_present(&self, id: ParticipationId, present: bool) -> Result<WriteOutcome>;

    async fn update_cancelled(&self, id: ParticipationId, cancelled: bool) -> Result<WriteOutcome>;

    async fn update_comments(&self, id: ParticipationId, comments: &str) -> Result<WriteOutcome>;

    async fn insert(&self, participant_id: ParticipantId, event_id: EventId) -> Result<WriteOutcome>;
}

/// 参与者（外部上下文提供）
pub trait Participant: Send + Sync {
    fn id(&self) -> ParticipantId;
    fn status(&self) -> &str;
}

/// 活动（外部上下文提供）
pub trait Event: Send + Sync {
    fn id(&self) -> EventId;
}

/// 报名成功后的通知出口，例如确认邮件
#[async_trait]
pub trait ParticipationNotifier: Send + Sync {
    async fn participation_created(
        &self,
        participant_id: ParticipantId,
        event_id: EventId,
    ) -> anyhow::Result<()>;
}

/// 报名结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub code: i32,
    pub message: String,
}

impl AddOutcome {
    pub fn ok() -> Self {
        Self {
            code: 0,
            message: "ok".to_string(),
        }
    }
}

/// 已加载的参与记录
///
/// 修改方法先写存储，写入成功后才更新内存中的字段；
/// 写入失败时内存状态保持调用前的值。
pub struct Participation {
    record: ParticipationRecord,
    repository: Arc<dyn ParticipationRepository>,
}

impl fmt::Debug for Participation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Participation")
            .field("record", &self.record)
            .finish()
    }
}

impl Participation {
    fn ensure_written(outcome: WriteOutcome) -> Result<()> {
        if outcome.success {
            Ok(())
        } else {
            Err(ParticipationError::UnknownError)
        }
    }

    pub fn to_model(&self) -> ParticipationRecord {
        self.record.clone()
    }

    pub fn id(&self) -> ParticipationId {
        self.record.id
    }

    pub fn participant_id(&self) -> ParticipantId {
        self.record.participant_id
    }

    pub fn event_id(&self) -> EventId {
        self.record.event_id
    }

    pub fn is_present(&self) -> bool {
        self.record.present
    }

    pub fn is_cancelled(&self) -> bool {
        self.record.cancelled
    }

    pub fn comments(&self) -> &str {
        &self.record.comments
    }

    /// 记录参与者是否到场
    pub async fn set_present(&mut self, present: bool) -> Result<()> {
        let outcome = self.repository.update_present(self.record.id, present).await?;
        Self::ensure_written(outcome)?;
        self.record.present = present;
        Ok(())
    }

    /// 设置参与是否取消
    pub async fn set_cancelled(&mut self, cancelled: bool) -> Result<()> {
        let outcome = self
            .repository
            .update_cancelled(self.record.id, cancelled)
            .await?;
        Self::ensure_written(outcome)?;
        self.record.cancelled = cancelled;
        Ok(())
    }

    pub async fn set_comments(&mut self, comments: &str) -> Result<()> {
        let outcome = self
            .repository
            .update_comments(self.record.id, comments)
            .await?;
        Self::ensure_written(outcome)?;
        self.record.comments = comments.to_string();
        Ok(())
    }
}

/// 参与记录领域服务
pub struct ParticipationService {
    repository: Arc<dyn ParticipationRepository>,
    notifier: Option<Arc<dyn ParticipationNotifier>>,
}

impl ParticipationService {
    pub fn new(repository: Arc<dyn ParticipationRepository>) -> Self {
        Self {
            repository,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ParticipationNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn has_notifier(&self) -> bool {
        self.notifier.is_some()
    }

    /// 按 (参与者, 活动) 加载参与记录，找不到时返回 AccessDenied
    pub async fn load(
        &self,
        participant_id: ParticipantId,
        event_id: EventId,
    ) -> Result<Participation> {
        let record = self
            .repository
            .find_by_participant_and_event(participant_id, event_id)
            .await?
            .ok_or(ParticipationError::AccessDenied(DenyReason::NoParticipation))?;
        Ok(Participation {
            record,
            repository: self.repository.clone(),
        })
    }

    /// 为活动新增参与者
    ///
    /// `force_creation` 为管理员操作，只跳过封禁检查。
    pub async fn add(
        &self,
        participant: &dyn Participant,
        event: &dyn Event,
        force_creation: bool,
    ) -> Result<AddOutcome> {
        let participant_id = participant.id();
        let event_id = event.id();

        if !force_creation && participant.status() == BANNED_STATUS {
            debug!(
                "participant {} is banned, registration to event {} refused",
                participant_id, event_id
            );
            return Err(ParticipationError::AccessDenied(DenyReason::Banned));
        }

        let outcome = self.repository.insert(participant_id, event_id).await?;
        Participation::ensure_written(outcome)?;

        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.participation_created(participant_id, event_id).await {
                warn!(
                    "failed to notify participant {} about event {}: {}",
                    participant_id, event_id, e
                );
            }
        }

        Ok(AddOutcome::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRepository {
        rows: Mutex<Vec<ParticipationRecord>>,
        fail_with: Mutex<Option<ParticipationError>>,
        skip_writes: AtomicBool,
    }

    impl FakeRepository {
        fn with_row(record: ParticipationRecord) -> Self {
            let repo = Self::default();
            repo.rows.lock().unwrap().push(record);
            repo
        }

        fn fail_next(&self, err: ParticipationError) {
            *self.fail_with.lock().unwrap() = Some(err);
        }

        fn check(&self) -> Result<bool> {
            if let Some(err) = self.fail_with.lock().unwrap().take() {
                return Err(err);
            }
            Ok(!self.skip_writes.load(Ordering::SeqCst))
        }

        fn update(
            &self,
            id: ParticipationId,
            apply: impl FnOnce(&mut ParticipationRecord),
        ) -> Result<WriteOutcome> {
            if !self.check()? {
                return Ok(WriteOutcome::not_written());
            }
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
                apply(row);
            }
            Ok(WriteOutcome::written())
        }

        fn stored(&self, id: ParticipationId) -> ParticipationRecord {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .unwrap()
        }

        fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ParticipationRepository for FakeRepository {
        async fn find_by_participant_and_event(
            &self,
            participant_id: ParticipantId,
            event_id: EventId,
        ) -> Result<Option<ParticipationRecord>> {
            self.check()?;
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.participant_id == participant_id && r.event_id == event_id)
                .cloned())
        }

        async fn update_present(&self, id: ParticipationId, present: bool) -> Result<WriteOutcome> {
            self.update(id, |r| r.present = present)
        }

        async fn update_cancelled(&self, id: ParticipationId, cancelled: bool) -> Result<WriteOutcome> {
            self.update(id, |r| r.cancelled = cancelled)
        }

        async fn update_comments(&self, id: ParticipationId, comments: &str) -> Result<WriteOutcome> {
            self.update(id, |r| r.comments = comments.to_string())
        }

        async fn insert(&self, participant_id: ParticipantId, event_id: EventId) -> Result<WriteOutcome> {
            if !self.check()? {
                return Ok(WriteOutcome::not_written());
            }
            let mut rows = self.rows.lock().unwrap();
            let id = ParticipationId::from(rows.len() as i64 + 1);
            rows.push(ParticipationRecord {
                id,
                participant_id,
                event_id,
                comments: String::new(),
                cancelled: false,
                present: false,
            });
            Ok(WriteOutcome::inserted(id))
        }
    }

    struct TestParticipant {
        id: ParticipantId,
        status: String,
    }

    impl Participant for TestParticipant {
        fn id(&self) -> ParticipantId {
            self.id
        }
        fn status(&self) -> &str {
            &self.status
        }
    }

    struct TestEvent(EventId);

    impl Event for TestEvent {
        fn id(&self) -> EventId {
            self.0
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        calls: Mutex<Vec<(ParticipantId, EventId)>>,
        fail: bool,
    }

    #[async_trait]
    impl ParticipationNotifier for RecordingNotifier {
        async fn participation_created(
            &self,
            participant_id: ParticipantId,
            event_id: EventId,
        ) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push((participant_id, event_id));
            if self.fail {
                anyhow::bail!("smtp unavailable");
            }
            Ok(())
        }
    }

    fn sample_record() -> ParticipationRecord {
        ParticipationRecord {
            id: ParticipationId::from(7),
            participant_id: ParticipantId::from(3),
            event_id: EventId::from(11),
            comments: "vegetarian".to_string(),
            cancelled: false,
            present: false,
        }
    }

    fn participant(status: &str) -> TestParticipant {
        TestParticipant {
            id: ParticipantId::from(3),
            status: status.to_string(),
        }
    }

    fn service_over(repo: &Arc<FakeRepository>) -> ParticipationService {
        ParticipationService::new(repo.clone())
    }

    #[tokio::test]
    async fn test_load_missing_pair_is_access_denied() {
        let repo = Arc::new(FakeRepository::default());
        let err = service_over(&repo)
            .load(ParticipantId::from(1), EventId::from(2))
            .await
            .unwrap_err();
        assert_eq!(err, ParticipationError::AccessDenied(DenyReason::NoParticipation));
    }

    #[tokio::test]
    async fn test_load_keeps_store_message() {
        let repo = Arc::new(FakeRepository::with_row(sample_record()));
        repo.fail_next(ParticipationError::StoreError("connection reset".to_string()));
        let err = service_over(&repo)
            .load(ParticipantId::from(3), EventId::from(11))
            .await
            .unwrap_err();
        assert_eq!(err, ParticipationError::StoreError("connection reset".to_string()));
    }

    #[tokio::test]
    async fn test_to_model_reproduces_stored_row() {
        let repo = Arc::new(FakeRepository::with_row(sample_record()));
        let participation = service_over(&repo)
            .load(ParticipantId::from(3), EventId::from(11))
            .await
            .unwrap();
        assert_eq!(participation.to_model(), sample_record());
        assert_eq!(participation.id(), ParticipationId::from(7));
        assert_eq!(participation.comments(), "vegetarian");
    }

    #[tokio::test]
    async fn test_set_present_is_visible_after_reload() {
        let repo = Arc::new(FakeRepository::with_row(sample_record()));
        let service = service_over(&repo);
        for value in [true, false, true] {
            let mut participation = service
                .load(ParticipantId::from(3), EventId::from(11))
                .await
                .unwrap();
            participation.set_present(value).await.unwrap();
            assert_eq!(participation.is_present(), value);

            let reloaded = service
                .load(ParticipantId::from(3), EventId::from(11))
                .await
                .unwrap();
            assert_eq!(reloaded.is_present(), value);
        }
    }

    #[tokio::test]
    async fn test_set_cancelled_and_comments() {
        let repo = Arc::new(FakeRepository::with_row(sample_record()));
        let mut participation = service_over(&repo)
            .load(ParticipantId::from(3), EventId::from(11))
            .await
            .unwrap();

        participation.set_cancelled(true).await.unwrap();
        participation.set_comments("arrives late").await.unwrap();

        assert!(participation.is_cancelled());
        assert_eq!(participation.comments(), "arrives late");
        let stored = repo.stored(ParticipationId::from(7));
        assert!(stored.cancelled);
        assert_eq!(stored.comments, "arrives late");
    }

    #[tokio::test]
    async fn test_cancelled_and_present_are_independent() {
        let repo = Arc::new(FakeRepository::with_row(sample_record()));
        let mut participation = service_over(&repo)
            .load(ParticipantId::from(3), EventId::from(11))
            .await
            .unwrap();

        participation.set_cancelled(true).await.unwrap();
        participation.set_present(true).await.unwrap();

        let stored = repo.stored(ParticipationId::from(7));
        assert!(stored.cancelled && stored.present);
    }

    #[tokio::test]
    async fn test_store_failure_leaves_memory_unchanged() {
        let repo = Arc::new(FakeRepository::with_row(sample_record()));
        let mut participation = service_over(&repo)
            .load(ParticipantId::from(3), EventId::from(11))
            .await
            .unwrap();

        repo.fail_next(ParticipationError::StoreError("deadlock".to_string()));
        let err = participation.set_present(true).await.unwrap_err();
        assert_eq!(err, ParticipationError::StoreError("deadlock".to_string()));
        assert!(!participation.is_present());

        repo.fail_next(ParticipationError::UnknownError);
        assert!(participation.set_comments("changed").await.is_err());
        assert_eq!(participation.comments(), "vegetarian");

        repo.fail_next(ParticipationError::StoreError("deadlock".to_string()));
        assert!(participation.set_cancelled(true).await.is_err());
        assert!(!participation.is_cancelled());

        assert_eq!(repo.stored(ParticipationId::from(7)), sample_record());
    }

    #[tokio::test]
    async fn test_unperformed_write_is_unknown_error() {
        let repo = Arc::new(FakeRepository::with_row(sample_record()));
        let mut participation = service_over(&repo)
            .load(ParticipantId::from(3), EventId::from(11))
            .await
            .unwrap();

        repo.skip_writes.store(true, Ordering::SeqCst);
        let err = participation.set_cancelled(true).await.unwrap_err();
        assert_eq!(err, ParticipationError::UnknownError);
        assert!(!participation.is_cancelled());
    }

    #[tokio::test]
    async fn test_add_banned_participant_is_refused() {
        let repo = Arc::new(FakeRepository::default());
        let err = service_over(&repo)
            .add(&participant(BANNED_STATUS), &TestEvent(EventId::from(11)), false)
            .await
            .unwrap_err();
        assert_eq!(err, ParticipationError::AccessDenied(DenyReason::Banned));
        assert_eq!(repo.row_count(), 0);
    }

    #[tokio::test]
    async fn test_forced_add_bypasses_ban() {
        let repo = Arc::new(FakeRepository::default());
        let service = service_over(&repo);
        let outcome = service
            .add(&participant(BANNED_STATUS), &TestEvent(EventId::from(11)), true)
            .await
            .unwrap();
        assert_eq!(outcome, AddOutcome { code: 0, message: "ok".to_string() });

        let participation = service
            .load(ParticipantId::from(3), EventId::from(11))
            .await
            .unwrap();
        assert!(!participation.is_present());
        assert!(!participation.is_cancelled());
        assert_eq!(participation.comments(), "");
    }

    #[tokio::test]
    async fn test_add_store_errors() {
        let repo = Arc::new(FakeRepository::default());
        let service = service_over(&repo);

        repo.fail_next(ParticipationError::StoreError("duplicate key".to_string()));
        let err = service
            .add(&participant("active"), &TestEvent(EventId::from(11)), false)
            .await
            .unwrap_err();
        assert_eq!(err, ParticipationError::StoreError("duplicate key".to_string()));

        repo.skip_writes.store(true, Ordering::SeqCst);
        let err = service
            .add(&participant("active"), &TestEvent(EventId::from(11)), false)
            .await
            .unwrap_err();
        assert_eq!(err, ParticipationError::UnknownError);
        assert_eq!(repo.row_count(), 0);
    }

    #[tokio::test]
    async fn test_add_notifies_and_tolerates_notifier_failure() {
        let repo = Arc::new(FakeRepository::default());
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let service = service_over(&repo).with_notifier(notifier.clone());

        let outcome = service
            .add(&participant("active"), &TestEvent(EventId::from(11)), false)
            .await
            .unwrap();

        assert_eq!(outcome, AddOutcome::ok());
        assert_eq!(
            notifier.calls.lock().unwrap().as_slice(),
            &[(ParticipantId::from(3), EventId::from(11))]
        );
        assert_eq!(repo.row_count(), 1);
    }

    #[tokio::test]
    async fn test_add_does_not_check_duplicates() {
        let repo = Arc::new(FakeRepository::default());
        let service = service_over(&repo);
        let event = TestEvent(EventId::from(11));
        service.add(&participant("active"), &event, false).await.unwrap();
        service.add(&participant("active"), &event, false).await.unwrap();
        assert_eq!(repo.row_count(), 2);
    }
}

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domain::participation::{
    ParticipationError, ParticipationRecord, ParticipationRepository, Result, WriteOutcome,
};
use domain::value::{EventId, ParticipantId, ParticipationId};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// 内存中的参与记录存储，行为与 ob_participation 表一致：
/// 自增 id，(id_participant, id_event) 唯一。
#[derive(Clone)]
pub struct InMemoryParticipationRepository {
    store: Arc<DashMap<ParticipationId, ParticipationRecord>>,
    pairs: Arc<DashMap<(ParticipantId, EventId), ParticipationId>>,
    next_id: Arc<AtomicI64>,
    enforce_unique: bool,
}

impl Default for InMemoryParticipationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryParticipationRepository {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            pairs: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
            enforce_unique: true,
        }
    }

    /// 不带唯一约束的存储，同一 (参与者, 活动) 可以有多条记录
    pub fn without_unique_constraint() -> Self {
        Self {
            enforce_unique: false,
            ..Self::new()
        }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn new_record(
        &self,
        participant_id: ParticipantId,
        event_id: EventId,
    ) -> ParticipationRecord {
        ParticipationRecord {
            id: ParticipationId::from(self.next_id.fetch_add(1, Ordering::SeqCst)),
            participant_id,
            event_id,
            comments: String::new(),
            cancelled: false,
            present: false,
        }
    }

    fn update(
        &self,
        id: ParticipationId,
        apply: impl FnOnce(&mut ParticipationRecord),
    ) -> Result<WriteOutcome> {
        // 与 UPDATE ... WHERE id = :id 相同，未命中任何行也算执行成功
        if let Some(mut entry) = self.store.get_mut(&id) {
            apply(entry.value_mut());
        }
        Ok(WriteOutcome::written())
    }
}

#[async_trait]
impl ParticipationRepository for InMemoryParticipationRepository {
    async fn find_by_participant_and_event(
        &self,
        participant_id: ParticipantId,
        event_id: EventId,
    ) -> Result<Option<ParticipationRecord>> {
        if self.enforce_unique {
            let id = self.pairs.get(&(participant_id, event_id)).map(|e| *e.value());
            return Ok(id.and_then(|id| self.store.get(&id).map(|e| e.value().clone())));
        }

        Ok(self
            .store
            .iter()
            .filter(|e| e.participant_id == participant_id && e.event_id == event_id)
            .map(|e| e.value().clone())
            .min_by_key(|r| r.id.as_i64()))
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
        if !self.enforce_unique {
            let record = self.new_record(participant_id, event_id);
            let id = record.id;
            self.store.insert(id, record);
            return Ok(WriteOutcome::inserted(id));
        }

        match self.pairs.entry((participant_id, event_id)) {
            Entry::Occupied(_) => Err(ParticipationError::StoreError(format!(
                "duplicate key value violates unique constraint \"ob_participation_participant_event_key\": ({}, {})",
                participant_id, event_id
            ))),
            Entry::Vacant(slot) => {
                let record = self.new_record(participant_id, event_id);
                let id = record.id;
                slot.insert(id);
                self.store.insert(id, record);
                Ok(WriteOutcome::inserted(id))
            }
        }
    }
}

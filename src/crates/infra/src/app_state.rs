use crate::config::AppConfigImpl;
use crate::notification::LogParticipationNotifier;
use crate::repository::postgres::command::ParticipationRepositoryImpl;
use application::command::participation::ParticipationAppService;
use application::query::get_participation::GetParticipation;
use domain::participation::{ParticipationRepository, ParticipationService};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// 组装好的参与记录服务
pub struct AppState {
    pub participation_service: Arc<ParticipationService>,
    pub participation_commands: ParticipationAppService,
    pub get_participation: GetParticipation,
}

impl AppState {
    pub fn new(repository: Arc<dyn ParticipationRepository>, cfg: &AppConfigImpl) -> Self {
        let mut service = ParticipationService::new(repository);
        if cfg.notification().enabled {
            service = service.with_notifier(Arc::new(LogParticipationNotifier));
        }
        let service = Arc::new(service);
        Self {
            participation_commands: ParticipationAppService::new(service.clone()),
            get_participation: GetParticipation::new(service.clone()),
            participation_service: service,
        }
    }

    pub fn with_postgres(db: DatabaseConnection, cfg: &AppConfigImpl) -> Self {
        Self::new(Arc::new(ParticipationRepositoryImpl::new(db)), cfg)
    }

    pub fn has_notifier(&self) -> bool {
        self.participation_service.has_notifier()
    }
}

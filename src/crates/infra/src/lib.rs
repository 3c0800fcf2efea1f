pub mod repository;

pub mod config;
pub use config::{AppConfigImpl, DatabaseConfig, NotificationConfig};

pub mod db;

pub mod notification;
pub use notification::LogParticipationNotifier;

pub mod app_state;
pub use app_state::AppState;

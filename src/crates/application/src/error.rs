use domain::participation::ParticipationError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Participation error: {0}")]
    ParticipationError(#[from] ParticipationError),
}

impl AppError {
    /// 取出底层领域错误，便于调用方区分错误类别
    pub fn participation_error(&self) -> &ParticipationError {
        match self {
            AppError::ParticipationError(e) => e,
        }
    }
}

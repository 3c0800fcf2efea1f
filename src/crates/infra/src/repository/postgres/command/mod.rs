pub mod db_data;
pub mod participation;

pub use participation::ParticipationRepositoryImpl;

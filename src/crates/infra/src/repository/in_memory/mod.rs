pub mod participation;

pub use participation::InMemoryParticipationRepository;

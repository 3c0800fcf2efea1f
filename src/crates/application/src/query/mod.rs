pub mod get_participation;

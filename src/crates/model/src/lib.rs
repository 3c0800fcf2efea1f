pub mod participation;

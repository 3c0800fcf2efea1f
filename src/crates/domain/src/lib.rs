pub mod participation;
pub mod value;

pub mod credential;
pub mod query;

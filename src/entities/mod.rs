pub mod query;
pub mod trial;

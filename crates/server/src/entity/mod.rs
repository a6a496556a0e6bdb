pub mod profile;
pub mod quiz;
pub mod submission;

pub mod dashboard;
pub mod sheets;

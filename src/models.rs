pub mod dashboard;
pub mod sheet;

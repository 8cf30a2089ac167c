pub mod calendar;
pub mod dashboard_service;
pub mod normalizer;
pub mod pipeline;
pub mod poller;

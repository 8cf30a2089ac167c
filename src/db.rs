pub mod google_auth;
pub use google_auth::{GoogleAuth, ServiceAccountKey};
pub mod record_source;
pub use record_source::RecordSource;
pub mod sheets_repo;
pub use sheets_repo::SheetsRepository;

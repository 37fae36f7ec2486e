pub mod cancel;
pub mod capture_session;

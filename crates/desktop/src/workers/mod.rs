pub mod capture_worker;
pub mod model_cache;

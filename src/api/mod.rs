pub mod http_backend;
pub mod models;
pub mod paths;
pub mod traits;

pub mod http;

pub use http::DellApiClient;

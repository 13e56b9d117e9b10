pub mod health;
pub mod latency;
pub mod routes;
pub mod templates;

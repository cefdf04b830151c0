pub mod error;
pub mod http;
pub mod routes;
pub mod state;

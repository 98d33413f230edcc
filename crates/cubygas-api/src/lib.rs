// cubygas-api: Async Rust client for the Cuby cloud gas-level API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{CloudClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use models::{ReadingResponse, TokenRequest, TokenResponse};
pub use transport::{TlsMode, TransportConfig};

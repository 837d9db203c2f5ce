// netrefit-api: Async Rust client for the dashboard control-plane REST API.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod devices;
mod networks;
mod vlans;

pub use client::DashboardClient;
pub use error::Error;

// ── Domain model ──

pub mod client;
pub mod mac;

pub use client::{NetworkInfo, QosInfo, RadioInfo, SecurityInfo};
pub use mac::MacAddress;

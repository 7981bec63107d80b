pub mod client;

pub use client::{ScanClient, ScanResult};

//! HTTP client library for the Bonds API.
//!
//! This crate provides a typed HTTP client for the bonds backend. Every
//! endpoint of the REST API has a matching method on [`BondsClient`].
//!
//! # Example
//!
//! ```no_run
//! use bonds_client::{BondsClient, ClientConfig, CreateBondRequest};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bonds_client::Error> {
//!     let client = BondsClient::new(ClientConfig {
//!         base_url: "http://localhost:8080".into(),
//!         timeout: Duration::from_secs(30),
//!         api_key: Some("owner-key".into()),
//!     })?;
//!
//!     let bond = client
//!         .create_bond(&CreateBondRequest {
//!             emmision_name: "Bond Valid ISIN".into(),
//!             isin: "CZ0003551251".into(),
//!             value: 10.0,
//!             interest: 2.9,
//!             purchase_date: "2024-06-16T12:00:00Z".into(),
//!             maturity_date: "2044-06-16T12:00:00Z".into(),
//!             interest_payment_frequency: "Yearly".into(),
//!         })
//!         .await?;
//!     println!("Created {}", bond.isin);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{BondsClient, ClientConfig};
pub use error::Error;
pub use types::*;

//! # Bonds API Backend - REST API Server
//!
//! A REST API for managing fixed-income holdings ("bonds") owned by users.
//! Built with [Axum](https://crates.io/crates/axum) for async HTTP handling and
//! provides OpenAPI/Swagger documentation via [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **CRUD for bonds**: create, list, read, partially update and delete the
//!   caller's bonds.
//!
//! - **Registry-checked ISINs**: every newly supplied ISIN is confirmed with an
//!   external registry, with a request timeout and a circuit breaker.
//!
//! - **Per-user statistics**: average interest, total value, compounded future
//!   value and the bond that matures first.
//!
//! - **API-key authentication**: owners see their own bonds; staff and
//!   superusers see everyone's.
//!
//! - **Pluggable storage**: PostgreSQL through `sqlx`, or in memory when no
//!   database is configured.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Route handlers, authentication extractor and router |
//! | [`auth`] | Users, API keys and the access rule |
//! | [`config`] | TOML configuration |
//! | [`db`] | Bond repositories (PostgreSQL, in-memory) |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`frequency`] | Payment frequency and payment counting |
//! | [`models`] | Bond record and request/response DTOs |
//! | [`registry`] | ISIN registry client |
//! | [`state`] | Application state |
//! | [`statistics`] | Per-user aggregates |
//! | [`validation`] | Attribute validation |
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/bonds` | List the caller's bonds |
//! | POST | `/api/v1/bonds` | Create a bond |
//! | GET | `/api/v1/bonds/{isin}` | Get a bond |
//! | PATCH | `/api/v1/bonds/{isin}` | Update some attributes of a bond |
//! | DELETE | `/api/v1/bonds/{isin}` | Delete a bond |
//! | GET | `/api/v1/bonds/user/{user_id}` | Statistics over a user's bonds |
//!
//! Every `/api/v1` request carries an `X-API-Key` header.
//!
//! ## Example Usage
//!
//! ```bash
//! # Start with a config file
//! BONDS_CONFIG=config.example.toml cargo run
//!
//! # Create a bond
//! curl -X POST http://localhost:8080/api/v1/bonds \
//!   -H "X-API-Key: owner-key" -H "Content-Type: application/json" \
//!   -d '{"emmision_name": "Bond Valid ISIN", "isin": "CZ0003551251",
//!        "value": 10.0, "interest": 2.9,
//!        "purchase_date": "2024-06-16T12:00:00Z",
//!        "maturity_date": "2044-06-16T12:00:00Z",
//!        "interest_payment_frequency": "Yearly"}'
//!
//! # Statistics for user 1
//! curl -H "X-API-Key: owner-key" http://localhost:8080/api/v1/bonds/user/1
//! ```
//!
//! ## Swagger UI
//!
//! ```text
//! http://localhost:8080/swagger-ui/
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod frequency;
pub mod models;
pub mod registry;
pub mod state;
pub mod statistics;
pub mod validation;

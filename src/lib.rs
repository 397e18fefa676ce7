//! Craftmessage: persistence and availability tracking for player messages.
//!
//! Players submit short messages from the game client; the server stores them
//! in `PostgreSQL` keyed by player identity. The store may be down at any
//! time, so every operation degrades to an empty or `false` result instead of
//! failing, and the store is re-probed lazily once it comes back.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: validated message types with no infrastructure dependencies
//! - **Ports**: the repository and store connector traits
//! - **Adapters**: `PostgreSQL` (Diesel + r2d2) and in-memory implementations
//!
//! # Modules
//!
//! - [`config`]: properties-file configuration with defaults
//! - [`store`]: availability probe and the Store Handle lifecycle
//! - [`message`]: message domain, repository, and the submission façade
//! - [`worker`]: the single background submission worker
//! - [`network`]: the submission payload and its server-side handler
//! - [`telemetry`]: tracing subscriber setup for binaries

pub mod config;
pub mod message;
pub mod network;
pub mod store;
pub mod telemetry;
pub mod worker;

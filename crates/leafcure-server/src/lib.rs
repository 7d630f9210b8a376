//! # Leafcure Server
//!
//! HTTP front end for the treatment recommendation service.
//!
//! ## API Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/chat` | Resolve `{ "query": ... }` to `{ "response": html }` |
//! | GET | `/health` | Catalog size, fingerprint and oracle backend |
//! | POST | `/reload` | Reload the catalog file in place |

pub mod config;
pub mod routes;
pub mod startup;
pub mod state;

pub use config::{Config, ConfigError, OracleBackend};
pub use startup::build_service;
pub use state::AppState;

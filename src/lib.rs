//! Database liveness checks over HTTP and the command line
//!
//! Connection settings come from the environment (`DB_TYPE`, `DB_HOST`,
//! `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`), are turned into a
//! [`descriptor::ConnectionDescriptor`] and probed with `SELECT 1`. Every
//! failure is classified into a small [`probe::Category`] taxonomy.

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod health;
pub mod metrics;
pub mod probe;
pub mod queries;

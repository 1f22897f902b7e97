//! Mappin Core - Domain models, synchronization store, and port definitions
//!
//! This crate contains the state synchronization core of the map-picking widget:
//! the slot registry, the reducer-style store, the initial-location bootstrap,
//! and the ports that map, geocoder, and host-form adapters implement.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod ports;
pub mod registry;
pub mod store;

pub use error::{MappinError, Result};

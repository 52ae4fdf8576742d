//! UnitKo application layer
//!
//! Shared state and the async view models a front end drives.

pub mod state;
pub mod viewmodel;

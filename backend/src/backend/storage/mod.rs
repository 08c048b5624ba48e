//! # Storage Module
//!
//! Handles persistence of profiles and care events.
//!
//! The domain layer only sees the traits in [`traits`]; the flat-file
//! implementation lives in [`csv`] and keeps one directory per profile with a
//! CSV file per event kind.

pub mod csv;
pub mod traits;

pub use traits::{Connection, EventStorage, ProfileStorage};

//! # IO Module
//!
//! Interface layer that exposes the domain services to the UI over REST.

pub mod rest;

pub use rest::*;

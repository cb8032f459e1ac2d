//! Curator Core - Shared types and ranking algorithms.
//!
//! This crate provides the domain types used across all Curator components:
//! - `admin` - Back-office service for curating product rails
//! - `cli` - Command-line tools for token management and bulk ranking
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. Everything that decides *what* to write to the catalog
//! lives here so it can be tested without a backend.
//!
//! # Modules
//!
//! - [`types`] - Product, tab, rank slot and pagination types
//! - [`ranking`] - Sorting, filtering, reordering and write planning

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ranking;
pub mod types;

pub use types::*;

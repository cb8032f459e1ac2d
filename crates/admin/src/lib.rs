//! Curator admin library.
//!
//! Back-office service for curating the "top selling" and "latest" product
//! rails of the storefront. The catalog itself lives in a remote REST
//! backend; this crate loads it, lets one operator reorder it, and writes
//! the result back.
//!
//! # Security
//!
//! The catalog token grants write access to every product. Run the service
//! on a private network only.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod prioritization;
pub mod routes;
pub mod state;

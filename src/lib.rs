//! Physical memory, cache-line bus, and swap backing store for CPU
//! simulators.

#![warn(missing_docs)]

pub mod addr;
pub mod bus;
pub mod cache;
pub mod config;
pub mod error;
pub mod mem;
pub mod swap;
pub mod trace;

pub use error::{MemError, Result};

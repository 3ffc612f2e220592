//! The paging backing store, which moves whole page frames between physical
//! memory and per-page files on disk.

pub mod codec;
mod store;

pub use store::SwapStore;

//===========================================================================//

//! Types for representing physical memory granularities and byte spans.

mod align;
mod span;

pub use align::Align;
pub use span::Span;

//===========================================================================//

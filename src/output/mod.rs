//! Export of classified curves.

pub mod svg;

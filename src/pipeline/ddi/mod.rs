//! Deterministic drug-drug interaction scan. Pure functions over static tables.

pub mod reference;
pub mod normalize;
pub mod interactions;

pub use reference::*;
pub use normalize::*;
pub use interactions::*;

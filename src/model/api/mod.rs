//! Shapes exchanged with REST clients that differ from the stored rows.

mod nomination;

pub use nomination::NominationDescription;

//! Deterministic decision logic - location validation and topic
//! classification over static tables
//!
//! Everything in this module is pure and synchronous; the gate checks in
//! the handlers are built from these primitives and run before any
//! provider is contacted.

pub mod location;
pub mod topic;

pub use location::Location;
pub use topic::TourismCategory;

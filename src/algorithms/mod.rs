//! Projection and triangulation algorithms

pub mod projection;
pub mod triangulation;

pub use projection::{Projector, UtmProjection};
pub use triangulation::{BearingTriangulator, PlanarLine};

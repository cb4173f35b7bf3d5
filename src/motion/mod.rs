//! Motion module for spherebot-motion.
//!
//! Turns a target position and a speed into a step sequence: the octant
//! transform, the inter-step timing, the Bresenham raster and the engine that
//! drives both axes with them.

mod engine;
mod octant;
mod raster;
mod speed;

pub use engine::{MotionEngine, MoveReport, MAX_MOVE_STEPS};
pub use octant::{AxisId, LinePlan, Octant};
pub use raster::LineRaster;
pub use speed::{clamp_speed, StepTiming};

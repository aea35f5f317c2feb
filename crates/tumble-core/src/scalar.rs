/// Floating point type used throughout the engine.
pub type Scalar = f32;

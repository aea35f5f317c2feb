pub mod equation;
pub mod contact;
pub mod pool;
pub mod gs;
pub mod constraint;

pub use equation::{Equation, JacobianElement, Spook};
pub use contact::{ContactEquation, FrictionEquation, tangent_basis};
pub use pool::EquationPool;
pub use gs::{GsSolver, Solver};
pub use constraint::{Constraint, DistanceConstraint, body_index};

//! Runtime for Brook
//!
//! Values, the snapshot-scoped environment, and the tree-walking evaluator.

mod environment;
mod evaluator;
mod value;

pub use environment::Environment;
pub use evaluator::Evaluator;
pub use value::Value;

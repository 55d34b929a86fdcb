//! GILL Runtime
//!
//! Values, environments, the native-module interface, and the tree-walking
//! interpreter.

pub mod env;
pub mod error;
pub mod interpreter;
pub mod modules;
pub mod native;
pub mod values;

pub use error::{RuntimeError, Signal};
pub use interpreter::Interpreter;
pub use values::Value;

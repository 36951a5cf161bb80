//! mp-runtime — the tree-walking evaluator for minipar.
//!
//! Takes a parsed, semantically-checked [`mp_par::ast::Ast`] and
//! executes it: variable scoping (`env`), the `Value`/`Flow` types a
//! statement or expression produces, the handful of builtin functions
//! that aren't user-definable, the TCP wire protocol behind
//! `c_channel`/`s_channel`, and the structured-concurrency semantics of
//! `par`.

mod builtins;
mod channel;
mod control;
mod env;
mod error;
mod eval;
mod value;

pub use control::Flow;
pub use error::{RunResult, RuntimeError};
pub use eval::{Evaluator, FunctionTable};
pub use value::Value;

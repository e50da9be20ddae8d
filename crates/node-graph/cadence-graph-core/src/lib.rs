//! Cadence procedure graphs.
//!
//! A procedure is a small dataflow graph with three coordinate inputs (`x`, `y`, `z`),
//! the current time, and a list of keyframed scalar parameters. Output nodes named
//! `x`, `y` and `z` produce the resulting position.

pub mod error;
pub mod eval;
pub mod procedure;
pub mod topo;
pub mod types;

pub use error::{GraphError, Result};
pub use eval::{eval_node, evaluate_all, GraphRuntime};
pub use procedure::{ParameterSpec, Procedure, ProcedureInputs};
pub use topo::topo_order;
pub use types::*;

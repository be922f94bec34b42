//! Query functions grouped by table family. Each takes a borrowed
//! connection so callers control transaction scope.

pub mod authority_ops;
pub mod bridge_ops;
pub mod log_ops;
pub mod param_ops;

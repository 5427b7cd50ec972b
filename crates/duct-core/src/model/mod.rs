//! Modelos neutrales (Context, PipeDef, FittingDef,...)

pub mod context;
pub mod definition;

pub use context::{is_reserved_output, Context, FinishFn, RESERVED_PREFIX};
pub use definition::{FittingDef, PipeDef, PipesConfig, Step};

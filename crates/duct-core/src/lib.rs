//! duct-core: motor declarativo de pipes y fittings
pub mod builtin;
pub mod engine;
pub mod errors;
pub mod fitting;
pub mod model;
pub mod resolve;


pub use engine::{EngineBuilder, Pipe, PipeEngine};
pub use errors::EngineError;
pub use fitting::{BoxFitting, Fitting, FittingFactory, FittingType, FittingTypeRegistry};
pub use model::{Context, FinishFn, FittingDef, PipeDef, PipesConfig, Step};
pub use resolve::{resolve_input, resolve_spec};

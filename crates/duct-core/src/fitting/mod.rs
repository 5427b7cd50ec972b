//! Definiciones relacionadas a Fittings.
//!
//! Un fitting es la unidad de trabajo del motor: recibe el contexto y produce
//! un resultado o un error. Este módulo define:
//! - `Fitting`: interfaz de capacidad (async) que implementan los fittings.
//! - `FittingFactory`: construye un fitting a partir de su definición.
//! - `FittingType` y `FittingTypeRegistry`: niveles de resolución explícitos
//!   (type-specified -> user -> system), sin sondeo de directorios.
//! - `WrappedFitting`: el contrato transversal pre-flight / post-flight.

pub mod handler;
pub mod registry;
pub mod types;
pub mod wrapper;

pub use handler::{BoxFitting, Fitting, FittingFactory};
pub use registry::{FittingType, FittingTypeRegistry};
pub use types::{SystemFittingType, UserFittingType};
pub use wrapper::WrappedFitting;

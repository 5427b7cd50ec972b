//! Fittings system acoplados al motor.
//!
//! Viven en el core (y no en el catálogo externo) porque necesitan resolver
//! pipes contra el compilador: el fan-out compila sus ramas y `onError`
//! compila su pipe manejador.

pub mod on_error;
pub mod parallel;

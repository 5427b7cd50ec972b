//! duct-fittings: catálogo system de fittings puros (F-datos)
//!
//! Este crate provee:
//! - Los fittings de manipulación de datos empaquetados con el motor: emit,
//!   memo, amend, pick, omit, values, first, parse y path.
//! - `install` para registrarlos en el nivel system de un `EngineBuilder`.
//!
//! Nota: el core sólo conoce la interfaz `Fitting`; acá no hay I/O. Los
//! fittings con efectos (HTTP, templating, lectura de archivos) son
//! colaboradores externos y se registran como fittings de usuario.

pub mod extract;
pub mod flow;
pub mod shape;

use duct_core::EngineBuilder;

/// Registra el catálogo completo en el nivel system del builder.
pub fn install(builder: EngineBuilder) -> EngineBuilder {
    builder.system_fitting("emit", flow::emit)
           .system_fitting("memo", flow::memo)
           .system_fitting("amend", shape::amend)
           .system_fitting("pick", shape::pick)
           .system_fitting("omit", shape::omit)
           .system_fitting("values", shape::values)
           .system_fitting("first", shape::first)
           .system_fitting("parse", extract::parse)
           .system_fitting("path", extract::path)
}

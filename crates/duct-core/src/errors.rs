//! Errores del motor de pipes.
//!
//! Un solo enum cubre la taxonomía completa: errores de configuración
//! (detectados al compilar/registrar), errores de resolución de parámetros y
//! errores de ejecución de fittings. Los errores se guardan en el `Context`
//! durante el ruteo, por eso derivan Serialize/Deserialize/Clone/PartialEq.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum EngineError {
    #[error("pipe not found: {0}")] PipeNotFound(String),
    #[error("invalid fitting type: {0}")] UnknownFittingType(String),
    #[error("fitting not found: {0}")] FittingNotFound(String),
    #[error("reserved output name: {0}")] ReservedOutput(String),
    #[error("invalid pipe definition: {0}")] InvalidDefinition(String),
    #[error("invalid parameter reference: {0}")] InvalidReference(String),
    #[error("fitting failed: {0}")] Fitting(String),
    #[error("internal: {0}")] Internal(String),
}

impl EngineError {
    /// Error de fitting a partir de cualquier mensaje.
    pub fn fitting(msg: impl Into<String>) -> Self {
        EngineError::Fitting(msg.into())
    }

    /// Errores que deben fallar rápido al compilar (nunca se rutean).
    pub fn is_configuration(&self) -> bool {
        matches!(self,
                 EngineError::PipeNotFound(_)
                 | EngineError::UnknownFittingType(_)
                 | EngineError::FittingNotFound(_)
                 | EngineError::ReservedOutput(_)
                 | EngineError::InvalidDefinition(_))
    }
}

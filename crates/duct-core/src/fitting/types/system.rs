//! Nivel `system`: el catálogo empaquetado con el motor.
//!
//! Es el último nivel de la resolución anónima: un nombre ausente aquí ya es
//! un error de configuración.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::engine::PipeEngine;
use crate::errors::EngineError;
use crate::fitting::handler::{BoxFitting, FittingFactory};
use crate::fitting::registry::FittingType;
use crate::model::FittingDef;

#[derive(Default)]
pub struct SystemFittingType {
    fittings: IndexMap<String, Arc<dyn FittingFactory>>,
}

impl SystemFittingType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, factory: Arc<dyn FittingFactory>) {
        self.fittings.insert(name.into(), factory);
    }

    pub fn names(&self) -> Vec<&str> {
        self.fittings.keys().map(|k| k.as_str()).collect()
    }
}

impl FittingType for SystemFittingType {
    fn create(&self, engine: &mut PipeEngine, def: &FittingDef) -> Result<Option<BoxFitting>, EngineError> {
        if def.name.is_empty() {
            return Err(EngineError::InvalidDefinition("name is required on fitting".into()));
        }
        match self.fittings.get(&def.name).cloned() {
            Some(factory) => {
                tracing::debug!(fitting = %def.name, "loaded system fitting");
                factory.create(engine, def).map(Some)
            }
            None => Err(EngineError::FittingNotFound(def.name.clone())),
        }
    }
}

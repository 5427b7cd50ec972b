//! Nivel `user`: fittings registrados por el caller.
//!
//! Si el nombre no está registrado y la definición no pidió `type: user`
//! explícitamente, devuelve `None` para que la resolución anónima siga con
//! el nivel siguiente. Con `type: user` explícito, la ausencia es un error.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::engine::PipeEngine;
use crate::errors::EngineError;
use crate::fitting::handler::{BoxFitting, FittingFactory};
use crate::fitting::registry::FittingType;
use crate::model::FittingDef;

#[derive(Default)]
pub struct UserFittingType {
    fittings: IndexMap<String, Arc<dyn FittingFactory>>,
}

impl UserFittingType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, factory: Arc<dyn FittingFactory>) {
        self.fittings.insert(name.into(), factory);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fittings.contains_key(name)
    }
}

impl FittingType for UserFittingType {
    fn create(&self, engine: &mut PipeEngine, def: &FittingDef) -> Result<Option<BoxFitting>, EngineError> {
        if def.name.is_empty() {
            return Err(EngineError::InvalidDefinition("name is required on fitting".into()));
        }
        match self.fittings.get(&def.name).cloned() {
            Some(factory) => {
                tracing::debug!(fitting = %def.name, "loaded user fitting");
                factory.create(engine, def).map(Some)
            }
            None if def.fitting_type.as_deref() == Some("user") => Err(EngineError::FittingNotFound(def.name.clone())),
            None => Ok(None),
        }
    }
}

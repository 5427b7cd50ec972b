//! Registro explícito de tipos de fitting.
//!
//! Reemplaza el descubrimiento por directorio del diseño original: cada tipo
//! se registra bajo un nombre y la resolución anónima sigue una lista de
//! prioridad explícita y testeable.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::engine::PipeEngine;
use crate::errors::EngineError;
use crate::fitting::handler::BoxFitting;
use crate::model::FittingDef;

/// Un tipo de fitting: factory de factories. `Ok(None)` significa "no aplica
/// en este nivel, probar el siguiente".
pub trait FittingType: Send + Sync {
    fn create(&self, engine: &mut PipeEngine, def: &FittingDef) -> Result<Option<BoxFitting>, EngineError>;
}

pub struct FittingTypeRegistry {
    types: IndexMap<String, Arc<dyn FittingType>>,
    /// Niveles que prueba la resolución anónima, en orden.
    anonymous_order: Vec<String>,
}

impl FittingTypeRegistry {
    pub fn new(anonymous_order: Vec<String>) -> Self {
        Self { types: IndexMap::new(),
               anonymous_order }
    }

    pub fn register(&mut self, name: impl Into<String>, fitting_type: Arc<dyn FittingType>) {
        self.types.insert(name.into(), fitting_type);
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn FittingType>, EngineError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::UnknownFittingType(name.to_string()))
    }

    pub fn anonymous_order(&self) -> &[String] {
        &self.anonymous_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;
    impl FittingType for Nothing {
        fn create(&self, _engine: &mut PipeEngine, _def: &FittingDef) -> Result<Option<BoxFitting>, EngineError> {
            Ok(None)
        }
    }

    #[test]
    fn resolve_unknown_type_fails() {
        let registry = FittingTypeRegistry::new(vec!["user".into(), "system".into()]);
        assert!(matches!(registry.resolve("controller"),
                         Err(EngineError::UnknownFittingType(_))));
    }

    #[test]
    fn registered_type_resolves_and_order_is_visible() {
        let mut registry = FittingTypeRegistry::new(vec!["user".into(), "system".into()]);
        registry.register("user", Arc::new(Nothing));
        assert!(registry.resolve("user").is_ok());
        assert_eq!(registry.anonymous_order(), ["user", "system"]);
    }
}

//! Builder para `PipeEngine`.
//!
//! Acumula catálogos de fittings (user y system), tipos adicionales, la lista
//! de prioridad anónima y las definiciones de pipes; `build` sella el
//! registro y compila todas las definiciones en orden de declaración, de modo
//! que las referencias entre pipes resuelvan hacia atrás.
//!
//! Los built-ins acoplados al motor (`parallel`, `onError`) vienen
//! pre-registrados en el nivel system; el catálogo de datos puros vive en el
//! crate de fittings y se instala aparte.

use serde_json::Value;
use std::sync::Arc;

use crate::builtin;
use crate::errors::EngineError;
use crate::fitting::{FittingFactory, FittingType, FittingTypeRegistry, SystemFittingType, UserFittingType};
use crate::model::{PipeDef, PipesConfig};

use super::core::PipeEngine;

pub struct EngineBuilder {
    config: Value,
    user: UserFittingType,
    system: SystemFittingType,
    extra_types: Vec<(String, Arc<dyn FittingType>)>,
    anonymous_order: Vec<String>,
    defs: PipesConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        let mut system = SystemFittingType::new();
        system.register("parallel", Arc::new(builtin::parallel::create));
        system.register("onError", Arc::new(builtin::on_error::create));

        Self { config: Value::Null,
               user: UserFittingType::new(),
               system,
               extra_types: Vec::new(),
               anonymous_order: vec!["user".to_string(), "system".to_string()],
               defs: PipesConfig::new() }
    }

    /// Configuración opaca compartida con las factories.
    pub fn config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Registra un fitting de usuario (sombrea al system homónimo).
    pub fn user_fitting(mut self, name: impl Into<String>, factory: impl FittingFactory + 'static) -> Self {
        self.user.register(name, Arc::new(factory));
        self
    }

    /// Registra un fitting en el catálogo system.
    pub fn system_fitting(mut self, name: impl Into<String>, factory: impl FittingFactory + 'static) -> Self {
        self.system.register(name, Arc::new(factory));
        self
    }

    /// Registra un tipo de fitting adicional bajo su propio nombre.
    pub fn fitting_type(mut self, name: impl Into<String>, fitting_type: Arc<dyn FittingType>) -> Self {
        self.extra_types.push((name.into(), fitting_type));
        self
    }

    /// Redefine la lista de prioridad de la resolución anónima.
    pub fn anonymous_order(mut self, order: Vec<String>) -> Self {
        self.anonymous_order = order;
        self
    }

    /// Agrega un documento completo de pipes (conserva el orden).
    pub fn pipes(mut self, defs: PipesConfig) -> Self {
        self.defs.extend(defs);
        self
    }

    /// Agrega una definición individual.
    pub fn pipe(mut self, name: impl Into<String>, def: PipeDef) -> Self {
        self.defs.insert(name.into(), def);
        self
    }

    /// Sella el registro y compila todas las definiciones declaradas, en
    /// orden. Los errores de configuración fallan acá, nunca en ejecución.
    pub fn build(self) -> Result<PipeEngine, EngineError> {
        let mut types = FittingTypeRegistry::new(self.anonymous_order);
        types.register("user", Arc::new(self.user));
        types.register("system", Arc::new(self.system));
        for (name, fitting_type) in self.extra_types {
            types.register(name, fitting_type);
        }

        let mut engine = PipeEngine::new(self.config, types, self.defs);

        let names: Vec<String> = engine.declared_names();
        for name in names {
            engine.compile(&name, None)?;
        }
        Ok(engine)
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

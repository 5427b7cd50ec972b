//! `onError`: registra el pipe manejador de errores del contexto.
//!
//! El input debe ser un nombre de pipe; si no hay un pipe declarado con ese
//! nombre se construye uno ad hoc de un solo paso (el nombre baja a fitting).
//! Siempre tiene éxito y deja pasar el `output` corriente sin tocarlo.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::engine::{Pipe, PipeEngine};
use crate::errors::EngineError;
use crate::fitting::{BoxFitting, Fitting};
use crate::model::{Context, FittingDef, PipeDef, Step};

/// Factory del fitting `onError`.
pub fn create(engine: &mut PipeEngine, def: &FittingDef) -> Result<BoxFitting, EngineError> {
    let name = match &def.input {
        Some(Value::String(name)) => name.clone(),
        _ => return Err(EngineError::InvalidDefinition("onError input must be a pipe name".into())),
    };

    let handler = match engine.compile(&name, None) {
        Ok(pipe) => pipe,
        Err(EngineError::PipeNotFound(_)) => {
            let ad_hoc = PipeDef::Steps(vec![Step::Name(name.clone())]);
            engine.compile_anonymous(&ad_hoc)?
        }
        Err(e) => return Err(e),
    };

    Ok(Box::new(OnErrorFitting { name, handler }))
}

struct OnErrorFitting {
    name: String,
    handler: Arc<Pipe>,
}

#[async_trait]
impl Fitting for OnErrorFitting {
    async fn invoke(&self, ctx: &mut Context) -> Result<Value, EngineError> {
        debug!(handler = %self.name, "setting error handler");
        ctx.error_handler = Some(Arc::clone(&self.handler));
        Ok(ctx.output.clone())
    }
}

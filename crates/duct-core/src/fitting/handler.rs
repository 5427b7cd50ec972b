use async_trait::async_trait;
use serde_json::Value;

use crate::engine::PipeEngine;
use crate::errors::EngineError;
use crate::model::{Context, FittingDef};

/// Trait que define un fitting ejecutable. El wrapper garantiza que `invoke`
/// se llama a lo sumo una vez por ejecución de paso.
#[async_trait]
pub trait Fitting: Send + Sync {
    /// Ejecuta el fitting contra el contexto. El valor retornado lo coloca el
    /// post-flight en el campo destino; los errores van al ruteo.
    async fn invoke(&self, ctx: &mut Context) -> Result<Value, EngineError>;
}

pub type BoxFitting = Box<dyn Fitting>;

/// Construye una instancia de fitting desde su definición. Recibe el motor
/// para que fittings acoplados (fan-out, onError) puedan resolver pipes.
pub trait FittingFactory: Send + Sync {
    fn create(&self, engine: &mut PipeEngine, def: &FittingDef) -> Result<BoxFitting, EngineError>;
}

impl<F> FittingFactory for F
    where F: Fn(&mut PipeEngine, &FittingDef) -> Result<BoxFitting, EngineError> + Send + Sync
{
    fn create(&self, engine: &mut PipeEngine, def: &FittingDef) -> Result<BoxFitting, EngineError> {
        self(engine, def)
    }
}

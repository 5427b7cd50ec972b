//! Contrato transversal aplicado a todo fitting: pre-flight de input,
//! invocación única y post-flight de output.
//!
//! Los dos canales de fallo (resolución de input y error del propio fitting)
//! colapsan en el mismo `Err(EngineError)`: el ruteo no los distingue.

use serde_json::Value;
use tracing::debug;

use crate::errors::EngineError;
use crate::fitting::handler::BoxFitting;
use crate::model::{is_reserved_output, Context, FittingDef};
use crate::resolve;

pub struct WrappedFitting {
    def: FittingDef,
    /// Campo destino ya validado (los nombres reservados fallan al construir,
    /// nunca después de producir un resultado).
    target: String,
    fitting: BoxFitting,
}

impl WrappedFitting {
    pub fn new(fitting: BoxFitting, def: FittingDef) -> Result<Self, EngineError> {
        let target = def.output.clone().unwrap_or_else(|| "output".to_string());
        if is_reserved_output(&target) {
            return Err(EngineError::ReservedOutput(target));
        }
        Ok(Self { def, target, fitting })
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub async fn call(&self, ctx: &mut Context) -> Result<(), EngineError> {
        self.preflight(ctx)?;
        debug!(fitting = %self.def.name, "enter fitting");
        let result = self.fitting.invoke(ctx).await?;
        debug!(fitting = %self.def.name, "exit fitting");
        self.postflight(ctx, result);
        Ok(())
    }

    /// Resuelve el input declarado y lo instala en `ctx.input`. Un objeto
    /// resuelto se fusiona con semántica fill-defaults (el input existente
    /// gana); `Null` conserva lo que hubiera; cualquier otro valor pisa.
    fn preflight(&self, ctx: &mut Context) -> Result<(), EngineError> {
        let resolved = resolve::resolve_input(ctx, self.def.input.as_ref())?;
        match resolved {
            Value::Object(map) => {
                let existing = std::mem::take(&mut ctx.input);
                ctx.input = resolve::fill_defaults(existing, map);
            }
            Value::Null => {}
            other => ctx.input = other,
        }
        Ok(())
    }

    /// Limpia el scratch y coloca el resultado en el campo destino.
    fn postflight(&self, ctx: &mut Context, result: Value) {
        ctx.input = Value::Null;
        ctx.set_field(&self.target, result);
    }
}

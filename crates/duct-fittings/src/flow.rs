//! Fittings de flujo: mueven valores entre campos del contexto.

use async_trait::async_trait;
use serde_json::Value;

use duct_core::errors::EngineError;
use duct_core::model::is_reserved_output;
use duct_core::{BoxFitting, Context, Fitting, FittingDef, PipeEngine};

/// `emit`: devuelve el input resuelto tal cual. Útil para inyectar literales
/// o referencias de parámetro directamente en `output`.
pub fn emit(_engine: &mut PipeEngine, _def: &FittingDef) -> Result<BoxFitting, EngineError> {
    Ok(Box::new(EmitFitting))
}

struct EmitFitting;

#[async_trait]
impl Fitting for EmitFitting {
    async fn invoke(&self, ctx: &mut Context) -> Result<Value, EngineError> {
        Ok(ctx.input.clone())
    }
}

/// `memo`: guarda el `output` corriente bajo el campo nombrado por el input y
/// lo deja pasar sin tocarlo.
pub fn memo(_engine: &mut PipeEngine, _def: &FittingDef) -> Result<BoxFitting, EngineError> {
    Ok(Box::new(MemoFitting))
}

struct MemoFitting;

#[async_trait]
impl Fitting for MemoFitting {
    async fn invoke(&self, ctx: &mut Context) -> Result<Value, EngineError> {
        let name = match &ctx.input {
            Value::String(name) => name.clone(),
            other => return Err(EngineError::fitting(format!("memo input must be a field name, got {other}"))),
        };
        if is_reserved_output(&name) {
            return Err(EngineError::ReservedOutput(name));
        }
        let current = ctx.output.clone();
        ctx.set_field(&name, current.clone());
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn emit_returns_resolved_input() {
        let fitting = EmitFitting;
        let mut ctx = Context::new();
        ctx.input = json!({"k": 1});
        assert_eq!(fitting.invoke(&mut ctx).await.unwrap(), json!({"k": 1}));
    }

    #[tokio::test]
    async fn memo_stashes_output_and_passes_it_through() {
        let fitting = MemoFitting;
        let mut ctx = Context::new();
        ctx.input = json!("saved");
        ctx.output = json!([1, 2]);
        let out = fitting.invoke(&mut ctx).await.unwrap();
        assert_eq!(out, json!([1, 2]));
        assert_eq!(ctx.field("saved"), Some(json!([1, 2])));
    }

    #[tokio::test]
    async fn memo_rejects_reserved_names() {
        let fitting = MemoFitting;
        let mut ctx = Context::new();
        ctx.input = json!("_hidden");
        assert!(matches!(fitting.invoke(&mut ctx).await,
                         Err(EngineError::ReservedOutput(_))));
    }
}

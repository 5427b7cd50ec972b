//! Fittings de extracción: decodifican o navegan el `output` corriente.

use async_trait::async_trait;
use serde_json::Value;

use duct_core::errors::EngineError;
use duct_core::{BoxFitting, Context, Fitting, FittingDef, PipeEngine};

/// `parse`: decodifica el output string según el formato pedido en el input.
/// Por ahora sólo `json`.
pub fn parse(_engine: &mut PipeEngine, _def: &FittingDef) -> Result<BoxFitting, EngineError> {
    Ok(Box::new(ParseFitting))
}

struct ParseFitting;

#[async_trait]
impl Fitting for ParseFitting {
    async fn invoke(&self, ctx: &mut Context) -> Result<Value, EngineError> {
        if ctx.input != Value::String("json".into()) {
            return Err(EngineError::fitting("parse input must be \"json\""));
        }
        let raw = match &ctx.output {
            Value::String(s) => s,
            other => return Err(EngineError::fitting(format!("parse output must be a string, got {other}"))),
        };
        serde_json::from_str(raw).map_err(|e| EngineError::fitting(format!("parse: {e}")))
    }
}

/// `path`: navega el output con una ruta punteada (`a.b.c`); `Null` cuando
/// algún tramo falta.
pub fn path(_engine: &mut PipeEngine, _def: &FittingDef) -> Result<BoxFitting, EngineError> {
    Ok(Box::new(PathFitting))
}

struct PathFitting;

#[async_trait]
impl Fitting for PathFitting {
    async fn invoke(&self, ctx: &mut Context) -> Result<Value, EngineError> {
        let route = match &ctx.input {
            Value::String(route) if !route.is_empty() => route.clone(),
            other => return Err(EngineError::fitting(format!("path input must be a dotted path, got {other}"))),
        };
        let mut current = &ctx.output;
        for segment in route.split('.') {
            let next = match current {
                Value::Object(map) => map.get(segment),
                // Segmentos numéricos indexan arrays.
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(next) => current = next,
                None => return Ok(Value::Null),
            }
        }
        Ok(current.clone())
    }
}

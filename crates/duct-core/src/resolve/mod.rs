//! Resolución de especificaciones de input contra el contexto.
//!
//! Funciones puras: un spec es un literal, un array (cada elemento se
//! resuelve en orden), un objeto (cada valor se resuelve conservando claves)
//! o una referencia de parámetro `{ in, name?, default? }`. Sin spec, el
//! input resuelto es el `output` corriente del contexto.

pub mod merge;
mod reference;

pub use merge::fill_defaults;
pub use reference::{ParamReference, ParamSource};

use serde_json::Value;

use crate::errors::EngineError;
use crate::model::Context;

/// Resuelve el input de un fitting. `None` equivale a "lo que venga fluyendo":
/// el `output` corriente.
pub fn resolve_input(ctx: &Context, spec: Option<&Value>) -> Result<Value, EngineError> {
    match spec {
        None => Ok(ctx.output.clone()),
        Some(spec) => resolve_spec(ctx, spec, None),
    }
}

/// Resuelve un spec arbitrario. `key` es la clave bajo la que el spec cuelga
/// en su objeto padre; una referencia sin `name` la usa como default.
pub fn resolve_spec(ctx: &Context, spec: &Value, key: Option<&str>) -> Result<Value, EngineError> {
    match spec {
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(resolve_spec(ctx, item, None)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) if reference::is_reference(map) => reference::resolve_reference(ctx, map, key),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), resolve_spec(ctx, v, Some(k))?);
            }
            Ok(Value::Object(out))
        }
        literal => Ok(literal.clone()),
    }
}

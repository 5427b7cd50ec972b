//! Referencias de parámetro: `{ in, name?, default? }`.
//!
//! `in` selecciona la fuente; `name` el campo dentro de ella (el nombre
//! literal `*` significa la fuente completa, no un campo llamado `*`). Un
//! valor ausente cae al `default` si existe, si no a `Null`: los fittings que
//! exigen el parámetro deben fallar explícitamente.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::EngineError;
use crate::model::Context;

/// Fuentes admitidas por una referencia de parámetro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    Body,
    Header,
    Query,
    Path,
    Parameters,
    Output,
    Context,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamReference {
    #[serde(rename = "in")]
    pub source: ParamSource,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
}

/// Un objeto spec es referencia cuando trae la clave `in`.
pub(crate) fn is_reference(map: &Map<String, Value>) -> bool {
    map.contains_key("in")
}

pub(crate) fn resolve_reference(ctx: &Context, map: &Map<String, Value>, key: Option<&str>) -> Result<Value, EngineError> {
    let reference: ParamReference =
        serde_json::from_value(Value::Object(map.clone())).map_err(|e| EngineError::InvalidReference(e.to_string()))?;

    let name = match reference.name.as_deref().or(key) {
        Some(n) => n.to_string(),
        None => return Err(EngineError::InvalidReference("parameter reference requires a name".into())),
    };

    // `context` no es un objeto JSON plano: se lee campo a campo.
    let value = if reference.source == ParamSource::Context {
        if name == "*" {
            Some(ctx.snapshot())
        } else {
            ctx.field(&name)
        }
    } else {
        let source = source_object(ctx, reference.source);
        if name == "*" {
            source
        } else {
            source.and_then(|s| s.get(&name).cloned())
        }
    };

    Ok(value.or(reference.default).unwrap_or(Value::Null))
}

/// Objeto fuente para las referencias respaldadas por request u output. Una
/// fuente ausente (p. ej. sin request) se trata como valor faltante.
fn source_object(ctx: &Context, source: ParamSource) -> Option<Value> {
    match source {
        ParamSource::Output => Some(ctx.output.clone()),
        ParamSource::Body => request_section(ctx, "body"),
        ParamSource::Header => request_section(ctx, "headers"),
        ParamSource::Query => request_section(ctx, "query"),
        ParamSource::Path => request_section(ctx, "path"),
        ParamSource::Parameters => request_section(ctx, "parameters"),
        ParamSource::Context => None,
    }
}

fn request_section(ctx: &Context, section: &str) -> Option<Value> {
    ctx.request.as_ref().and_then(|r| r.get(section)).cloned()
}

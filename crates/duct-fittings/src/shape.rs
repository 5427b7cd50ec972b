//! Fittings de forma: reestructuran el `output` corriente.

use async_trait::async_trait;
use serde_json::{Map, Value};

use duct_core::errors::EngineError;
use duct_core::{BoxFitting, Context, Fitting, FittingDef, PipeEngine};

/// `amend`: fusiona el input (objeto) sobre el output; el input gana. Un
/// output nulo se trata como objeto vacío.
pub fn amend(_engine: &mut PipeEngine, _def: &FittingDef) -> Result<BoxFitting, EngineError> {
    Ok(Box::new(AmendFitting))
}

struct AmendFitting;

#[async_trait]
impl Fitting for AmendFitting {
    async fn invoke(&self, ctx: &mut Context) -> Result<Value, EngineError> {
        let patch = match &ctx.input {
            Value::Object(map) => map.clone(),
            _ => return Err(EngineError::fitting("amend input must be an object")),
        };
        let mut base = match &ctx.output {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            _ => return Err(EngineError::fitting("amend output must be an object")),
        };
        for (k, v) in patch {
            base.insert(k, v);
        }
        Ok(Value::Object(base))
    }
}

/// `pick`: proyecta el output a las claves del input (clave suelta o lista).
/// Sobre un array de objetos aplica elemento a elemento.
pub fn pick(_engine: &mut PipeEngine, _def: &FittingDef) -> Result<BoxFitting, EngineError> {
    Ok(Box::new(ProjectFitting { keep: true }))
}

/// `omit`: el inverso de `pick`, descarta las claves del input.
pub fn omit(_engine: &mut PipeEngine, _def: &FittingDef) -> Result<BoxFitting, EngineError> {
    Ok(Box::new(ProjectFitting { keep: false }))
}

struct ProjectFitting {
    keep: bool,
}

impl ProjectFitting {
    fn project(&self, value: &Value, keys: &[String]) -> Value {
        match value {
            Value::Object(map) => {
                let projected: Map<String, Value> =
                    map.iter()
                       .filter(|(k, _)| keys.contains(k) == self.keep)
                       .map(|(k, v)| (k.clone(), v.clone()))
                       .collect();
                Value::Object(projected)
            }
            other => other.clone(),
        }
    }
}

#[async_trait]
impl Fitting for ProjectFitting {
    async fn invoke(&self, ctx: &mut Context) -> Result<Value, EngineError> {
        let keys = key_list(&ctx.input)?;
        match &ctx.output {
            Value::Array(items) => Ok(Value::Array(items.iter().map(|item| self.project(item, &keys)).collect())),
            other => Ok(self.project(other, &keys)),
        }
    }
}

fn key_list(input: &Value) -> Result<Vec<String>, EngineError> {
    match input {
        Value::String(key) => Ok(vec![key.clone()]),
        Value::Array(items) => items.iter()
                                    .map(|item| match item {
                                        Value::String(key) => Ok(key.clone()),
                                        other => Err(EngineError::fitting(format!("key list expects strings, got {other}"))),
                                    })
                                    .collect(),
        other => Err(EngineError::fitting(format!("input must be a key or key list, got {other}"))),
    }
}

/// `values`: los valores del objeto output como array.
pub fn values(_engine: &mut PipeEngine, _def: &FittingDef) -> Result<BoxFitting, EngineError> {
    Ok(Box::new(ValuesFitting))
}

struct ValuesFitting;

#[async_trait]
impl Fitting for ValuesFitting {
    async fn invoke(&self, ctx: &mut Context) -> Result<Value, EngineError> {
        match &ctx.output {
            Value::Object(map) => Ok(Value::Array(map.values().cloned().collect())),
            Value::Array(items) => Ok(Value::Array(items.clone())),
            other => Err(EngineError::fitting(format!("values output must be an object, got {other}"))),
        }
    }
}

/// `first`: el primer elemento del array output (`Null` si está vacío o no
/// hay array).
pub fn first(_engine: &mut PipeEngine, _def: &FittingDef) -> Result<BoxFitting, EngineError> {
    Ok(Box::new(FirstFitting))
}

struct FirstFitting;

#[async_trait]
impl Fitting for FirstFitting {
    async fn invoke(&self, ctx: &mut Context) -> Result<Value, EngineError> {
        match &ctx.output {
            Value::Array(items) => Ok(items.first().cloned().unwrap_or(Value::Null)),
            _ => Ok(Value::Null),
        }
    }
}

//! Contexto de ejecución: el registro mutable que fluye por un pipe.
//!
//! Un `Context` vive exactamente una invocación top-level. El motor es el
//! único dueño mientras el pipe corre; el fan-out deriva copias independientes
//! por rama con `branch()`. Campos frontera (`request`, `response`,
//! `status_code`, `headers`) pertenecen al adaptador que invoca; los fittings
//! genéricos sólo los leen.
use indexmap::IndexMap;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::engine::Pipe;
use crate::errors::EngineError;
use std::sync::Arc;

/// Prefijo reservado para campos internos del contexto.
pub const RESERVED_PREFIX: char = '_';

/// Continuación terminal aportada por el adaptador (p. ej. volcar la
/// respuesta HTTP). El motor la invoca exactamente una vez por ejecución.
pub type FinishFn = Box<dyn FnOnce(&mut Context) + Send>;

pub struct Context {
    /// Identificador de la invocación (correlaciona trazas concurrentes).
    pub id: Uuid,
    /// Scratch de entrada del fitting en curso; se limpia tras cada paso.
    pub input: Value,
    /// Resultado corriente; destino por defecto del post-flight.
    pub output: Value,
    /// Error en ruteo (si lo hay).
    pub error: Option<EngineError>,
    /// Asociación no-dueña al pipe manejador de errores (el cache del motor
    /// es quien posee los pipes compilados).
    pub error_handler: Option<Arc<Pipe>>,
    /// Continuación terminal; `None` en contextos de rama.
    pub finish: Option<FinishFn>,
    /// Request opaco del adaptador (body/headers/query/path/parameters).
    pub request: Option<Value>,
    /// Response opaco del adaptador.
    pub response: Option<Value>,
    pub status_code: Option<u16>,
    /// Pares nombre/valor en orden de inserción.
    pub headers: Vec<(String, String)>,
    /// Campos nombrados creados por fittings con `output` custom.
    vars: IndexMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4(),
               input: Value::Null,
               output: Value::Null,
               error: None,
               error_handler: None,
               finish: None,
               request: None,
               response: None,
               status_code: None,
               headers: Vec::new(),
               vars: IndexMap::new() }
    }

    /// Contexto independiente para una rama del fan-out: copia los campos
    /// legibles al momento del snapshot, sin continuación ni manejador.
    pub fn branch(&self) -> Self {
        Self { id: Uuid::new_v4(),
               input: self.input.clone(),
               output: self.output.clone(),
               error: None,
               error_handler: None,
               finish: None,
               request: self.request.clone(),
               response: self.response.clone(),
               status_code: self.status_code,
               headers: self.headers.clone(),
               vars: self.vars.clone() }
    }

    /// Lee un campo por nombre, cubriendo tanto los fijos como los creados
    /// dinámicamente por `set_field`.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "input" => Some(self.input.clone()),
            "output" => Some(self.output.clone()),
            "statusCode" => self.status_code.map(|c| json!(c)),
            "error" => self.error.as_ref().map(|e| json!(e.to_string())),
            _ => self.vars.get(name).cloned(),
        }
    }

    /// Escribe el campo destino de un post-flight. `output` e `input` son
    /// campos fijos; cualquier otro nombre va al mapa dinámico.
    pub fn set_field(&mut self, name: &str, value: Value) {
        match name {
            "output" => self.output = value,
            "input" => self.input = value,
            _ => {
                self.vars.insert(name.to_string(), value);
            }
        }
    }

    /// Snapshot JSON del contexto completo (fuente `context` con nombre `*`).
    pub fn snapshot(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("input".into(), self.input.clone());
        map.insert("output".into(), self.output.clone());
        if let Some(code) = self.status_code {
            map.insert("statusCode".into(), json!(code));
        }
        if let Some(err) = &self.error {
            map.insert("error".into(), json!(err.to_string()));
        }
        for (k, v) in &self.vars {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
         .field("id", &self.id)
         .field("input", &self.input)
         .field("output", &self.output)
         .field("error", &self.error)
         .field("status_code", &self.status_code)
         .field("has_finish", &self.finish.is_some())
         .field("has_error_handler", &self.error_handler.is_some())
         .finish()
    }
}

/// Nombres que un `FittingDef.output` no puede usar: el prefijo reservado y
/// los campos frontera del adaptador.
pub fn is_reserved_output(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX) || name == "request" || name == "response"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_copies_readable_fields_and_drops_continuations() {
        let mut ctx = Context::new();
        ctx.input = json!("scratch");
        ctx.output = json!({"a": 1});
        ctx.status_code = Some(200);
        ctx.set_field("memoized", json!(42));
        ctx.finish = Some(Box::new(|_| {}));

        let b = ctx.branch();
        assert_eq!(b.input, json!("scratch"));
        assert_eq!(b.output, json!({"a": 1}));
        assert_eq!(b.field("memoized"), Some(json!(42)));
        assert!(b.finish.is_none());
        assert!(b.error_handler.is_none());
        assert_ne!(b.id, ctx.id);
    }

    #[test]
    fn reserved_output_names() {
        assert!(is_reserved_output("_errorHandler"));
        assert!(is_reserved_output("request"));
        assert!(is_reserved_output("response"));
        assert!(!is_reserved_output("output"));
        assert!(!is_reserved_output("results"));
    }
}

//! Pipe compilado: cadena ejecutable de links.
//!
//! Un link es un fitting envuelto o un empalme a otro pipe compilado. La
//! ejecución es estrictamente secuencial sobre un mismo contexto: el paso
//! siguiente nunca arranca antes de que el anterior termine. Como un pipe
//! puede empalmar pipes, `run` devuelve un futuro boxeado (recursión async).

use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

use crate::errors::EngineError;
use crate::fitting::WrappedFitting;
use crate::model::Context;
use crate::resolve;

pub(crate) enum Link {
    Fitting(WrappedFitting),
    /// Empalme inline de un pipe ya compilado; si trae input spec, se
    /// resuelve contra el contexto ANTES de entrar al sub-pipe.
    PipeRef {
        name: String,
        input: Option<Value>,
        pipe: Arc<Pipe>,
    },
}

pub struct Pipe {
    name: String,
    links: Vec<Link>,
}

pub type PipeFuture<'a> = Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 'a>>;

impl Pipe {
    pub(crate) fn new(name: impl Into<String>, links: Vec<Link>) -> Self {
        Self { name: name.into(),
               links }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Ejecuta la cadena completa sobre el contexto. El primer error corta y
    /// se propaga al caller (el ruteo vive en el motor, no acá).
    pub fn run<'a>(&'a self, ctx: &'a mut Context) -> PipeFuture<'a> {
        Box::pin(async move {
            for link in &self.links {
                match link {
                    Link::Fitting(wrapped) => wrapped.call(ctx).await?,
                    Link::PipeRef { name, input, pipe } => {
                        debug!(pipe = %name, "running spliced pipe");
                        if let Some(spec) = input {
                            ctx.input = resolve::resolve_spec(ctx, spec, None)?;
                        }
                        pipe.run(ctx).await?;
                    }
                }
            }
            Ok(())
        })
    }
}

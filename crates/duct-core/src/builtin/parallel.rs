//! Fan-out paralelo: la única fuente de concurrencia real del motor.
//!
//! El input es un mapa rama -> nombre de pipe o definición inline. Las ramas
//! se resuelven/compilan al crear el fitting (sólo referencias hacia atrás).
//! En ejecución, cada rama corre de punta a punta sobre una copia
//! independiente del contexto; el resultado es un objeto clave -> output de
//! rama. Una rama que falla hace fallar el fan-out completo con su error,
//! pero las hermanas en vuelo NUNCA se cancelan: corren hasta terminar y sus
//! resultados se descartan.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

use crate::engine::{Pipe, PipeEngine};
use crate::errors::EngineError;
use crate::fitting::{BoxFitting, Fitting};
use crate::model::{Context, FittingDef, PipeDef};

/// Factory del fitting `parallel`.
pub fn create(engine: &mut PipeEngine, def: &FittingDef) -> Result<BoxFitting, EngineError> {
    let branches = match &def.input {
        Some(Value::Object(map)) => map,
        _ => return Err(EngineError::InvalidDefinition("parallel input must be a branch map".into())),
    };

    let mut resolved: Vec<(String, Arc<Pipe>)> = Vec::with_capacity(branches.len());
    for (key, branch) in branches {
        let pipe = match branch {
            Value::String(name) => engine.compile(name, None)?,
            inline => {
                let branch_def: PipeDef = serde_json::from_value(inline.clone())
                    .map_err(|e| EngineError::InvalidDefinition(format!("parallel branch {key}: {e}")))?;
                engine.compile_anonymous(&branch_def)?
            }
        };
        resolved.push((key.clone(), pipe));
    }

    Ok(Box::new(ParallelFitting { branches: resolved }))
}

struct ParallelFitting {
    branches: Vec<(String, Arc<Pipe>)>,
}

#[async_trait]
impl Fitting for ParallelFitting {
    async fn invoke(&self, ctx: &mut Context) -> Result<Value, EngineError> {
        let mut set: JoinSet<(usize, Result<Value, EngineError>)> = JoinSet::new();

        for (idx, (key, pipe)) in self.branches.iter().enumerate() {
            let mut branch_ctx = ctx.branch();
            let pipe = Arc::clone(pipe);
            let key = key.clone();
            set.spawn(async move {
                debug!(branch = %key, invocation = %branch_ctx.id, "starting parallel branch");
                let result = match pipe.run(&mut branch_ctx).await {
                    Ok(()) => Ok(branch_ctx.output),
                    Err(err) => Err(err),
                };
                debug!(branch = %key, "finished parallel branch");
                (idx, result)
            });
        }

        // Drenar TODO el set: las hermanas de una rama fallida corren igual.
        let mut slots: Vec<Option<Result<Value, EngineError>>> = (0..self.branches.len()).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            let (idx, result) = joined.map_err(|e| EngineError::Internal(format!("parallel branch join: {e}")))?;
            slots[idx] = Some(result);
        }

        // Primer error en orden de declaración de ramas (determinista).
        let mut assembled = serde_json::Map::with_capacity(self.branches.len());
        for (idx, (key, _)) in self.branches.iter().enumerate() {
            match slots[idx].take() {
                Some(Ok(output)) => {
                    assembled.insert(key.clone(), output);
                }
                Some(Err(err)) => return Err(err),
                None => return Err(EngineError::Internal(format!("parallel branch {key} never completed"))),
            }
        }
        Ok(Value::Object(assembled))
    }
}

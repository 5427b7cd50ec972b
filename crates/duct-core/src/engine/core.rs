//! Core PipeEngine implementation
//!
//! Motor de ejecución de pipes declarativos: compila definiciones en cadenas
//! de fittings envueltos, las cachea por nombre y ejecuta contextos a través
//! de ellas ruteando errores al pipe manejador si existe.
//!
//! Tras la construcción (o tras las compilaciones explícitas) el motor es
//! inmutable: registro y cache son write-once-per-name / read-many, así que
//! un `Arc<PipeEngine>` sirve ejecuciones concurrentes sin sincronización.

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::EngineError;
use crate::fitting::{BoxFitting, FittingTypeRegistry, WrappedFitting};
use crate::model::{Context, FittingDef, PipeDef, PipesConfig, Step};

use super::builder::EngineBuilder;
use super::pipe::{Link, Pipe};

pub struct PipeEngine {
    config: Value,
    types: FittingTypeRegistry,
    /// Definiciones declaradas aún no compiladas (compilación perezosa).
    defs: PipesConfig,
    /// Cache de pipes compilados: write-once por nombre, estable de por vida.
    pipes: IndexMap<String, Arc<Pipe>>,
}

impl PipeEngine {
    /// Crea un nuevo builder para configurar el motor.
    #[inline]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub(crate) fn new(config: Value, types: FittingTypeRegistry, defs: PipesConfig) -> Self {
        Self { config,
               types,
               defs,
               pipes: IndexMap::new() }
    }

    /// Configuración compartida del motor (opaca, disponible a las factories).
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Pipe ya compilado, por nombre.
    pub fn pipe(&self, name: &str) -> Result<Arc<Pipe>, EngineError> {
        self.pipes
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::PipeNotFound(name.to_string()))
    }

    /// Declara una definición para compilación perezosa posterior.
    pub fn register_pipe(&mut self, name: impl Into<String>, def: PipeDef) {
        self.defs.insert(name.into(), def);
    }

    /// Nombres de pipes declarados, en orden de declaración.
    pub fn declared_names(&self) -> Vec<String> {
        self.defs.keys().cloned().collect()
    }

    /// Compila (o devuelve del cache) el pipe `name`. Sin definición inline
    /// ni pre-registrada, falla con `PipeNotFound`. Idempotente por nombre.
    pub fn compile(&mut self, name: &str, def: Option<&PipeDef>) -> Result<Arc<Pipe>, EngineError> {
        if let Some(pipe) = self.pipes.get(name) {
            return Ok(Arc::clone(pipe));
        }

        let declared;
        let def = match def {
            Some(d) => d,
            None => match self.defs.get(name) {
                Some(d) => {
                    declared = d.clone();
                    &declared
                }
                None => return Err(EngineError::PipeNotFound(name.to_string())),
            },
        };

        debug!(pipe = %name, "compiling pipe");
        let pipe = Arc::new(self.build_pipe(name, def)?);
        self.pipes.insert(name.to_string(), Arc::clone(&pipe));
        Ok(pipe)
    }

    /// Compila una definición sin nombre (ramas inline del fan-out, pipes ad
    /// hoc del onError). No entra al cache.
    pub(crate) fn compile_anonymous(&mut self, def: &PipeDef) -> Result<Arc<Pipe>, EngineError> {
        Ok(Arc::new(self.build_pipe("(anonymous)", def)?))
    }

    fn build_pipe(&mut self, name: &str, def: &PipeDef) -> Result<Pipe, EngineError> {
        let links = match def {
            PipeDef::Fitting(fdef) => vec![Link::Fitting(self.create_fitting(fdef)?)],
            PipeDef::Steps(steps) => {
                let mut links = Vec::with_capacity(steps.len());
                for step in steps {
                    links.push(self.build_step(step)?);
                }
                links
            }
        };
        Ok(Pipe::new(name, links))
    }

    /// Baja un paso declarativo a un link ejecutable. Sólo los nombres YA
    /// compilados resuelven como pipes (referencias hacia atrás); cualquier
    /// otro nombre baja a fitting.
    fn build_step(&mut self, step: &Step) -> Result<Link, EngineError> {
        match step {
            Step::Name(name) => {
                if let Some(pipe) = self.pipes.get(name) {
                    Ok(Link::PipeRef { name: name.clone(),
                                       input: None,
                                       pipe: Arc::clone(pipe) })
                } else {
                    Ok(Link::Fitting(self.create_fitting(&FittingDef::named(name.clone()))?))
                }
            }
            Step::Map(map) if map.len() == 1 => {
                let (key, value) = map.first().expect("one-entry map");
                if let Some(pipe) = self.pipes.get(key) {
                    Ok(Link::PipeRef { name: key.clone(),
                                       input: Some(value.clone()),
                                       pipe: Arc::clone(pipe) })
                } else {
                    Ok(Link::Fitting(self.create_fitting(&FittingDef::with_input(key.clone(), value.clone()))?))
                }
            }
            Step::Map(map) => {
                // Fan-out: el mapa completo es el input del fitting `parallel`.
                let input = Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect());
                Ok(Link::Fitting(self.create_fitting(&FittingDef::with_input("parallel", input))?))
            }
        }
    }

    /// Crea y envuelve un fitting desde su definición, respetando el orden de
    /// resolución: tipo explícito, o la lista de prioridad anónima.
    pub fn create_fitting(&mut self, def: &FittingDef) -> Result<WrappedFitting, EngineError> {
        debug!(fitting = %def.name, fitting_type = ?def.fitting_type, "create fitting");

        let raw = match def.fitting_type.clone() {
            Some(type_name) => self.new_raw_fitting(&type_name, def)?
                                   .ok_or_else(|| EngineError::FittingNotFound(def.name.clone()))?,
            None => {
                let tiers = self.types.anonymous_order().to_vec();
                let mut found = None;
                for tier in &tiers {
                    if let Some(fitting) = self.new_raw_fitting(tier, def)? {
                        found = Some(fitting);
                        break;
                    }
                }
                found.ok_or_else(|| EngineError::FittingNotFound(def.name.clone()))?
            }
        };

        WrappedFitting::new(raw, def.clone())
    }

    fn new_raw_fitting(&mut self, type_name: &str, def: &FittingDef) -> Result<Option<BoxFitting>, EngineError> {
        let fitting_type = self.types.resolve(type_name)?;
        fitting_type.create(self, def)
    }

    /// Ejecuta un pipe sobre un contexto fresco: corre la cadena, rutea el
    /// error si lo hay e invoca la continuación terminal exactamente una vez.
    pub async fn run(&self, pipe: Arc<Pipe>, mut ctx: Context) -> Context {
        debug!(pipe = %pipe.name(), invocation = %ctx.id, "running pipe");

        if let Err(err) = pipe.run(&mut ctx).await {
            self.route_error(&mut ctx, err).await;
        }

        if let Some(finish) = ctx.finish.take() {
            finish(&mut ctx);
        }
        ctx
    }

    /// Variante por nombre de `run`.
    pub async fn run_pipe(&self, name: &str, ctx: Context) -> Result<Context, EngineError> {
        let pipe = self.pipe(name)?;
        Ok(self.run(pipe, ctx).await)
    }

    /// Ruteo de errores: con manejador registrado, el contexto entra al pipe
    /// manejador; sin él (o si el manejador también falla) aplica el estado
    /// de fallo por defecto. Nunca recursa.
    async fn route_error(&self, ctx: &mut Context, err: EngineError) {
        debug!(invocation = %ctx.id, error = %err, "caught error");

        match ctx.error_handler.clone() {
            None => unhandled(ctx, err),
            Some(handler) => {
                ctx.error = Some(err);
                debug!(pipe = %handler.name(), "starting error handler pipe");
                if let Err(handler_err) = handler.run(ctx).await {
                    warn!(error = %handler_err, "error handler pipe failed");
                    unhandled(ctx, handler_err);
                }
            }
        }
    }
}

/// Estado de fallo por defecto: equivalente a un 500 con el mensaje del error
/// como cuerpo. El adaptador decide qué hacer con él en la continuación.
fn unhandled(ctx: &mut Context, err: EngineError) {
    warn!(invocation = %ctx.id, error = %err, "unhandled pipe error");
    ctx.status_code = Some(500);
    ctx.output = Value::String(err.to_string());
    ctx.error = Some(err);
}

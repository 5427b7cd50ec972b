//! Demo del motor de pipes: compila un documento declarativo y ejecuta
//! varios escenarios (secuencia con sub-pipe, ruteo de errores, fan-out).

use duct_core::{Context, EngineError, PipeEngine, PipesConfig};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("DUCT_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run_sequence_demo().await {
        eprintln!("[demo secuencia] {e}");
    }
    if let Err(e) = run_error_routing_demo().await {
        eprintln!("[demo onError] {e}");
    }
    if let Err(e) = run_fan_out_demo().await {
        eprintln!("[demo fan-out] {e}");
    }
}

/// Secuencia con sub-pipe empalmado y reshaping del catálogo system.
async fn run_sequence_demo() -> Result<(), EngineError> {
    let defs: PipesConfig = serde_json::from_value(json!({
        "seed": [{ "emit": { "id": 1, "name": "valve", "internal": "scrap" } }],
        "main": [
            "seed",
            { "amend": { "origin": "demo" } },
            { "omit": "internal" },
            { "memo": "record" }
        ]
    })).expect("documento de pipes del demo");

    let engine = duct_fittings::install(PipeEngine::builder()).pipes(defs).build()?;
    let ctx = engine.run_pipe("main", Context::new()).await?;

    println!("== secuencia ==");
    println!("output: {}", ctx.output);
    println!("record: {}", ctx.field("record").unwrap_or_default());
    Ok(())
}

/// Un fitting que falla con un pipe manejador registrado vía `onError`.
async fn run_error_routing_demo() -> Result<(), EngineError> {
    let defs: PipesConfig = serde_json::from_value(json!({
        "recover": [{ "emit": "recovered from failure" }],
        "main": [
            { "onError": "recover" },
            { "parse": "json" }
        ]
    })).expect("documento de pipes del demo");

    // `parse` exige un output string: con output Null falla y el contexto
    // entra al pipe manejador.
    let engine = duct_fittings::install(PipeEngine::builder()).pipes(defs).build()?;
    let ctx = engine.run_pipe("main", Context::new()).await?;

    println!("== onError ==");
    println!("error: {:?}", ctx.error.map(|e| e.to_string()));
    println!("output: {}", ctx.output);
    Ok(())
}

/// Fan-out de tres ramas sobre copias independientes del contexto.
async fn run_fan_out_demo() -> Result<(), EngineError> {
    let defs: PipesConfig = serde_json::from_value(json!({
        "ids": [{ "emit": [101, 102] }],
        "labels": [{ "emit": ["valve", "elbow"] }],
        "fan": [
            { "emit": "catalog" },
            { "ids": "ids", "labels": "labels", "source": [{ "emit": { "in": "output", "name": "*" } }] }
        ]
    })).expect("documento de pipes del demo");

    let engine = duct_fittings::install(PipeEngine::builder()).pipes(defs).build()?;
    let ctx = engine.run_pipe("fan", Context::new()).await?;

    println!("== fan-out ==");
    println!("output: {}", ctx.output);
    Ok(())
}

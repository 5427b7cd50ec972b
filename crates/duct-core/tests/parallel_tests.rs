use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use duct_core::{BoxFitting, Context, EngineError, Fitting, FittingDef, PipeEngine, PipesConfig};
use serde_json::{json, Value};

struct Slow {
    completed: Arc<AtomicBool>,
}

#[async_trait]
impl Fitting for Slow {
    async fn invoke(&self, _ctx: &mut Context) -> Result<Value, EngineError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.completed.store(true, Ordering::SeqCst);
        Ok(json!("slow"))
    }
}

struct Faulty;

#[async_trait]
impl Fitting for Faulty {
    async fn invoke(&self, _ctx: &mut Context) -> Result<Value, EngineError> {
        Err(EngineError::fitting("branch down"))
    }
}

fn faulty_factory(_engine: &mut PipeEngine, _def: &FittingDef) -> Result<BoxFitting, EngineError> {
    Ok(Box::new(Faulty))
}

#[tokio::test]
async fn fan_out_assembles_keyed_results() {
    let defs: PipesConfig = serde_json::from_value(json!({
        "pipeA": [{ "emit": 1 }],
        "pipeB": [{ "emit": 2 }],
        "fan": [{ "a": "pipeA", "b": "pipeB" }]
    })).unwrap();
    let engine = duct_fittings::install(PipeEngine::builder()).pipes(defs).build().unwrap();

    let ctx = engine.run_pipe("fan", Context::new()).await.unwrap();
    assert_eq!(ctx.output, json!({"a": 1, "b": 2}));
    assert!(ctx.error.is_none());
}

#[tokio::test]
async fn fan_out_accepts_inline_branch_definitions() {
    let defs: PipesConfig = serde_json::from_value(json!({
        "pipeA": [{ "emit": "named" }],
        "fan": [{ "x": "pipeA", "y": [{ "emit": "inline" }] }]
    })).unwrap();
    let engine = duct_fittings::install(PipeEngine::builder()).pipes(defs).build().unwrap();

    let ctx = engine.run_pipe("fan", Context::new()).await.unwrap();
    assert_eq!(ctx.output, json!({"x": "named", "y": "inline"}));
}

#[tokio::test]
async fn branches_read_the_fan_out_snapshot_independently() {
    // Each branch sees the output at fan-out time; sibling writes never leak.
    let defs: PipesConfig = serde_json::from_value(json!({
        "keep": ["emit"],
        "stamp": [{ "emit": "stamped" }],
        "fan": [{ "emit": "snapshot" }, { "same": "keep", "other": "stamp" }]
    })).unwrap();
    let engine = duct_fittings::install(PipeEngine::builder()).pipes(defs).build().unwrap();

    let ctx = engine.run_pipe("fan", Context::new()).await.unwrap();
    assert_eq!(ctx.output, json!({"same": "snapshot", "other": "stamped"}));
}

#[tokio::test]
async fn failing_branch_fails_the_fan_out_once() {
    let defs: PipesConfig = serde_json::from_value(json!({
        "pipeA": [{ "emit": 1 }],
        "pipeBad": ["explode"],
        "fan": [{ "a": "pipeA", "bad": "pipeBad" }]
    })).unwrap();
    let engine = duct_fittings::install(PipeEngine::builder())
        .user_fitting("explode", faulty_factory)
        .pipes(defs)
        .build()
        .unwrap();

    let finishes = Arc::new(AtomicUsize::new(0));
    let mut ctx = Context::new();
    let finish_count = Arc::clone(&finishes);
    ctx.finish = Some(Box::new(move |_ctx: &mut Context| {
        finish_count.fetch_add(1, Ordering::SeqCst);
    }));

    let ctx = engine.run_pipe("fan", ctx).await.unwrap();

    // The surviving branch's result is discarded; the context enters error
    // routing exactly once even though pipeA completed.
    assert_eq!(ctx.error, Some(EngineError::fitting("branch down")));
    assert_eq!(ctx.status_code, Some(500));
    assert_eq!(finishes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn siblings_run_to_completion_when_a_branch_fails() {
    let completed = Arc::new(AtomicBool::new(false));
    let slow_flag = Arc::clone(&completed);

    let defs: PipesConfig = serde_json::from_value(json!({
        "pipeBad": ["explode"],
        "pipeSlow": ["slow"],
        "fan": [{ "bad": "pipeBad", "slow": "pipeSlow" }]
    })).unwrap();
    let engine = duct_fittings::install(PipeEngine::builder())
        .user_fitting("explode", faulty_factory)
        .user_fitting("slow",
                      move |_: &mut PipeEngine, _: &FittingDef| -> Result<BoxFitting, EngineError> {
                          Ok(Box::new(Slow { completed: Arc::clone(&slow_flag) }))
                      })
        .pipes(defs)
        .build()
        .unwrap();

    let ctx = engine.run_pipe("fan", Context::new()).await.unwrap();

    // "bad" fails immediately, but the fan-out still drains "slow".
    assert_eq!(ctx.error, Some(EngineError::fitting("branch down")));
    assert!(completed.load(Ordering::SeqCst), "sibling branch was not drained");
}

#[test]
fn fan_out_branch_naming_an_unknown_pipe_is_a_configuration_error() {
    let defs: PipesConfig = serde_json::from_value(json!({
        "fan": [{ "a": "nowhere", "b": "alsoNowhere" }]
    })).unwrap();
    let result = duct_fittings::install(PipeEngine::builder()).pipes(defs).build();
    assert!(matches!(result, Err(EngineError::PipeNotFound(_))));
}

use duct_core::{Context, EngineError, PipeEngine, PipesConfig};
use serde_json::json;

fn engine_with_catalog(defs: serde_json::Value) -> Result<PipeEngine, EngineError> {
    let defs: PipesConfig = serde_json::from_value(defs).expect("valid pipes document");
    duct_fittings::install(PipeEngine::builder()).pipes(defs).build()
}

#[tokio::test]
async fn emit_pipe_places_literal_input_in_output() {
    // The canonical one-fitting pipe: emit echoes its resolved input.
    let engine = engine_with_catalog(json!({
        "pipe": [{ "emit": "something" }]
    })).unwrap();

    let ctx = engine.run_pipe("pipe", Context::new()).await.unwrap();
    assert_eq!(ctx.output, json!("something"));
    assert!(ctx.error.is_none());
}

#[tokio::test]
async fn whole_system_catalog_compiles_from_single_key_steps() {
    // Every bundled data fitting instantiates through the anonymous
    // resolution path (user first, then system).
    let engine = engine_with_catalog(json!({
        "catalog": [
            { "emit": "{\"a\": {\"b\": 1}, \"z\": 2}" },
            { "parse": "json" },
            { "memo": "parsed" },
            { "amend": { "extra": true } },
            { "omit": "extra" },
            { "pick": ["a", "z"] },
            { "path": "a" },
            "values",
            "first"
        ]
    })).unwrap();

    let ctx = engine.run_pipe("catalog", Context::new()).await.unwrap();
    // parse -> {a: {b: 1}, z: 2}; path "a" -> {b: 1}; values -> [1]; first -> 1
    assert_eq!(ctx.output, json!(1));
    assert_eq!(ctx.field("parsed"), Some(json!({"a": {"b": 1}, "z": 2})));
}

#[tokio::test]
async fn user_fittings_shadow_system_fittings_by_name() {
    use async_trait::async_trait;
    use duct_core::{BoxFitting, Fitting, FittingDef};
    use serde_json::Value;

    struct Fixed;

    #[async_trait]
    impl Fitting for Fixed {
        async fn invoke(&self, _ctx: &mut Context) -> Result<Value, EngineError> {
            Ok(json!("pre-initialized"))
        }
    }

    let defs: PipesConfig = serde_json::from_value(json!({
        "pipe": [{ "emit": "ignored" }]
    })).unwrap();

    let builder = duct_fittings::install(PipeEngine::builder());
    let engine = builder.user_fitting("emit", |_: &mut PipeEngine, _: &FittingDef| -> Result<BoxFitting, EngineError> {
                            Ok(Box::new(Fixed))
                        })
                        .pipes(defs)
                        .build()
                        .unwrap();

    let ctx = engine.run_pipe("pipe", Context::new()).await.unwrap();
    assert_eq!(ctx.output, json!("pre-initialized"));
}

#[tokio::test]
async fn spliced_pipe_reference_carries_explicit_input() {
    // "identity" is compiled first, so "main" splices it inline; the step's
    // input spec lands in context.input before entering the sub-pipe.
    let engine = engine_with_catalog(json!({
        "identity": ["emit"],
        "main": [{ "identity": "explicit" }]
    })).unwrap();

    let ctx = engine.run_pipe("main", Context::new()).await.unwrap();
    assert_eq!(ctx.output, json!("explicit"));
}

#[tokio::test]
async fn sub_pipes_compose_with_fittings_in_sequence() {
    let engine = engine_with_catalog(json!({
        "prep": [{ "emit": { "a": 1 } }],
        "main": ["prep", { "amend": { "b": 2 } }]
    })).unwrap();

    let ctx = engine.run_pipe("main", Context::new()).await.unwrap();
    assert_eq!(ctx.output, json!({"a": 1, "b": 2}));
}

#[test]
fn reserved_output_name_is_a_configuration_error() {
    // Fails while building, before any execution can produce a result.
    let result = engine_with_catalog(json!({
        "bad": { "name": "emit", "input": "x", "output": "_stash" }
    }));
    assert!(matches!(result, Err(EngineError::ReservedOutput(name)) if name == "_stash"));

    let result = engine_with_catalog(json!({
        "bad": { "name": "emit", "input": "x", "output": "response" }
    }));
    assert!(matches!(result, Err(EngineError::ReservedOutput(_))));
}

#[test]
fn unknown_fitting_name_is_a_configuration_error() {
    let result = engine_with_catalog(json!({
        "bad": ["no_such_fitting"]
    }));
    assert!(matches!(result, Err(EngineError::FittingNotFound(name)) if name == "no_such_fitting"));
}

#[test]
fn explicit_type_resolution_is_strict() {
    // `type: user` with no such user fitting registered does not fall
    // through to the system tier.
    let result = engine_with_catalog(json!({
        "bad": { "name": "emit", "type": "user", "input": 1 }
    }));
    assert!(matches!(result, Err(EngineError::FittingNotFound(name)) if name == "emit"));

    // An unregistered fitting type is its own configuration error.
    let result = engine_with_catalog(json!({
        "bad": { "name": "emit", "type": "controller", "input": 1 }
    }));
    assert!(matches!(result, Err(EngineError::UnknownFittingType(name)) if name == "controller"));
}

#[tokio::test]
async fn explicit_system_type_bypasses_user_shadowing() {
    use async_trait::async_trait;
    use duct_core::{BoxFitting, Fitting, FittingDef};
    use serde_json::Value;

    struct Shadow;

    #[async_trait]
    impl Fitting for Shadow {
        async fn invoke(&self, _ctx: &mut Context) -> Result<Value, EngineError> {
            Ok(json!("shadowed"))
        }
    }

    let defs: PipesConfig = serde_json::from_value(json!({
        "pipe": { "name": "emit", "type": "system", "input": "direct" }
    })).unwrap();

    let engine = duct_fittings::install(PipeEngine::builder())
        .user_fitting("emit", |_: &mut PipeEngine, _: &FittingDef| -> Result<BoxFitting, EngineError> {
            Ok(Box::new(Shadow))
        })
        .pipes(defs)
        .build()
        .unwrap();

    let ctx = engine.run_pipe("pipe", Context::new()).await.unwrap();
    assert_eq!(ctx.output, json!("direct"));
}

#[tokio::test]
async fn run_pipe_by_unknown_name_fails() {
    let engine = engine_with_catalog(json!({
        "pipe": [{ "emit": 1 }]
    })).unwrap();

    assert!(matches!(engine.run_pipe("missing", Context::new()).await,
                     Err(EngineError::PipeNotFound(_))));
}

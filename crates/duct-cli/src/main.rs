use duct_core::{Context, PipeEngine, PipesConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Cargar .env si existe para obtener DUCT_LOG u otros ajustes
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("DUCT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    // CLI mínima: `duct run --pipes <file.json> --pipe <name> [--input <json>]`
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && args[1] == "run" {
        let mut pipes_file: Option<String> = None;
        let mut pipe_name: Option<String> = None;
        let mut input: Option<String> = None;
        let mut i = 2;
        while i < args.len() {
            match args[i].as_str() {
                "--pipes" => {
                    i += 1;
                    if i < args.len() { pipes_file = Some(args[i].clone()); }
                }
                "--pipe" => {
                    i += 1;
                    if i < args.len() { pipe_name = Some(args[i].clone()); }
                }
                "--input" => {
                    i += 1;
                    if i < args.len() { input = Some(args[i].clone()); }
                }
                _ => {}
            }
            i += 1;
        }

        let (Some(pipes_file), Some(pipe_name)) = (pipes_file, pipe_name) else {
            eprintln!("Uso: duct run --pipes <file.json> --pipe <name> [--input <json>]");
            std::process::exit(2);
        };

        let raw = match std::fs::read_to_string(&pipes_file) {
            Ok(raw) => raw,
            Err(e) => { eprintln!("[duct run] no se pudo leer {pipes_file}: {e}"); std::process::exit(4); }
        };
        let defs: PipesConfig = match serde_json::from_str(&raw) {
            Ok(defs) => defs,
            Err(e) => { eprintln!("[duct run] documento de pipes inválido: {e}"); std::process::exit(4); }
        };

        let engine = match duct_fittings::install(PipeEngine::builder()).pipes(defs).build() {
            Ok(engine) => engine,
            Err(e) => { eprintln!("[duct run] error de configuración: {e}"); std::process::exit(4); }
        };

        let mut ctx = Context::new();
        if let Some(input) = input {
            match serde_json::from_str(&input) {
                Ok(value) => ctx.output = value,
                Err(e) => { eprintln!("[duct run] input inválido: {e}"); std::process::exit(2); }
            }
        }

        match engine.run_pipe(&pipe_name, ctx).await {
            Ok(ctx) => {
                if let Some(err) = &ctx.error {
                    eprintln!("[duct run] pipe terminó con error: {err}");
                    println!("{}", serde_json::to_string_pretty(&ctx.output).unwrap_or_default());
                    std::process::exit(5);
                }
                println!("{}", serde_json::to_string_pretty(&ctx.output).unwrap_or_default());
            }
            Err(e) => { eprintln!("[duct run] {e}"); std::process::exit(4); }
        }
    } else {
        eprintln!("Uso: duct run --pipes <file.json> --pipe <name> [--input <json>]");
        std::process::exit(2);
    }
}

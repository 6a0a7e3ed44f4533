use std::path::Path;
use std::process::ExitCode;

use sentinel_lib::config::{self, BackendKind, EngineConfig};
use sentinel_lib::models::AuditOutcome;
use sentinel_lib::pipeline::audit::AuditPipeline;
use sentinel_lib::pipeline::engine::{MockReviewEngine, OllamaClient, ReviewEngine};

const USAGE: &str = "usage: sentinel <note-file> <labs-file> <meds-file>";

/// Read a source document. A missing file is treated as an empty document.
fn load_source(path: &Path) -> std::io::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Source file not found, using empty text");
            Ok(String::new())
        }
        Err(e) => Err(e),
    }
}

fn build_engine(config: &EngineConfig) -> Result<Box<dyn ReviewEngine>, String> {
    match config.backend {
        BackendKind::Mock => Ok(Box::new(MockReviewEngine::new())),
        BackendKind::Ollama => OllamaClient::from_config(config)
            .map(|client| Box::new(client) as Box<dyn ReviewEngine>)
            .map_err(|e| e.to_string()),
    }
}

fn run(args: &[String]) -> Result<AuditOutcome, String> {
    let [note_path, labs_path, meds_path] = args else {
        return Err(USAGE.to_string());
    };

    let note = load_source(Path::new(note_path)).map_err(|e| format!("{note_path}: {e}"))?;
    let labs = load_source(Path::new(labs_path)).map_err(|e| format!("{labs_path}: {e}"))?;
    let meds = load_source(Path::new(meds_path)).map_err(|e| format!("{meds_path}: {e}"))?;

    let engine_config = EngineConfig::from_env().map_err(|e| e.to_string())?;
    let engine = build_engine(&engine_config)?;

    let pipeline = AuditPipeline::new(engine.as_ref()).with_options(engine_config.options.clone());
    Ok(pipeline.run_audit(&note, &labs, &meds))
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    sentinel_lib::init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = match run(&args) {
        Ok(outcome) => outcome,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize outcome: {e}");
            return ExitCode::FAILURE;
        }
    }

    if outcome.is_blocked() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let text = load_source(&dir.path().join("absent.txt")).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn existing_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Warfarin 5mg daily").unwrap();
        let text = load_source(file.path()).unwrap();
        assert_eq!(text.trim(), "Warfarin 5mg daily");
    }

    #[test]
    fn wrong_arg_count_is_usage_error() {
        let err = run(&["only-one".to_string()]).unwrap_err();
        assert_eq!(err, USAGE);
    }

    #[test]
    fn mock_backend_builds() {
        let config = EngineConfig {
            backend: BackendKind::Mock,
            ..EngineConfig::default()
        };
        let engine = build_engine(&config).unwrap();
        assert_eq!(engine.model(), "mock-model");
    }
}

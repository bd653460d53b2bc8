use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use subgen::cli::{Cli, Commands};
use subgen::config::Config;
use subgen::jobs::{JobRequest, JobStatus};
use subgen::models::{ModelInfo, list_models, resolver};
use subgen::service::SubgenService;
use subgen::translate::google;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Transcribe {
            input,
            engine,
            model,
            language,
            translate_to,
            audio_track,
            no_post_processing,
            no_embedded,
            output,
        } => {
            let request = JobRequest {
                engine: engine.unwrap_or_else(|| JobRequest::default().engine),
                model: model.unwrap_or_else(|| JobRequest::default().model),
                language: language.unwrap_or_else(|| JobRequest::default().language),
                translate_to,
                use_post_processing: !no_post_processing,
                audio_track,
                prefer_embedded: !no_embedded,
            };
            run_transcribe(config, &input, request, output).await?;
        }
        Commands::Models => print_models(&config),
        Commands::Languages => print_languages(),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("could not load config from {}", path.display())),
        None => {
            let default = dirs::config_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("subgen/config.toml");
            Config::load_or_default(&default)
                .with_context(|| format!("could not load config from {}", default.display()))
        }
    }
}

async fn run_transcribe(
    config: Config,
    input: &Path,
    request: JobRequest,
    copy_to: Option<PathBuf>,
) -> Result<()> {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .context("input path has no file name")?;

    let service = SubgenService::new(config)?;
    let id = service.submit(input, &file_name, request).await?;
    println!("job {id}");

    let job = loop {
        let job = service.status(&id).await?;
        print!("\r{:<16} {:>3}%", job.status.to_string(), job.progress);
        std::io::stdout().flush().ok();
        if job.status.is_terminal() {
            println!();
            break job;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    };

    match job.status {
        JobStatus::Completed => {
            let result = service.result(&id).await?;
            let output_path = job.output_path.context("completed job has no output path")?;
            if let Some(target) = copy_to {
                std::fs::copy(&output_path, &target)
                    .with_context(|| format!("could not copy output to {}", target.display()))?;
                println!("{}", target.display());
            } else {
                println!("{}", output_path.display());
            }
            eprintln!(
                "{} segment(s), {} word(s), {:.1}s of audio",
                result.segment_count, result.word_count, result.duration_seconds
            );
            Ok(())
        }
        _ => {
            let message = job.error.unwrap_or_else(|| "unknown error".to_string());
            bail!("transcription failed: {message}");
        }
    }
}

/// One catalog row: installed models are marked, missing ones show where
/// to download them from.
fn model_line(model: &ModelInfo, installed: bool) -> String {
    let hint = if installed { "[installed]" } else { model.url };
    format!("  {:<12} {:>5} MB  {}", model.name, model.size_mb, hint)
}

fn print_models(config: &Config) {
    let installed = resolver::available_models(&config.tools.models_dir);
    println!("models directory: {}", config.tools.models_dir.display());
    println!();
    for model in list_models() {
        let present = resolver::resolve_model(&config.tools.models_dir, model.name).is_ok();
        println!("{}", model_line(model, present));
    }
    let extra: Vec<_> = installed
        .iter()
        .filter(|name| list_models().iter().all(|m| m.name != name.as_str()))
        .collect();
    if !extra.is_empty() {
        println!();
        println!("other model files present:");
        for name in extra {
            println!("  {name}");
        }
    }
}

fn print_languages() {
    for (name, code) in google::LANGUAGES {
        println!("  {code:<6} {name}");
    }
}

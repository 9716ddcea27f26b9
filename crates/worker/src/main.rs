mod cli;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use beatforge_core::GenerationResult;
use beatforge_events::{spawn_progress_writer, NdjsonWriter, ProgressBus, StreamEvent};
use beatforge_llm::{HttpTextGenerator, LlmConfig, ScriptedTextGenerator, TextGenerator};
use beatforge_pipeline::{Brain, PipelineConfig};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beatforge_worker=info,beatforge_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let out = Arc::new(NdjsonWriter::new(std::io::stdout()));

    let outcome = run(&cli, &out).await;
    finish(&out, outcome)
}

/// Run the pipeline, streaming progress through a [`ProgressBus`]. Every
/// progress line is written before this returns.
async fn run<W: Write + Send + 'static>(
    cli: &Cli,
    out: &Arc<NdjsonWriter<W>>,
) -> anyhow::Result<GenerationResult> {
    let request = cli.request()?;
    let config = PipelineConfig::from_env();

    let generator: Arc<dyn TextGenerator> = match &cli.response_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading response file {}", path.display()))?;
            tracing::info!(path = %path.display(), "Replaying saved response");
            Arc::new(ScriptedTextGenerator::replying(text))
        }
        None => {
            let llm = LlmConfig::from_env()?;
            tracing::info!(api_url = %llm.api_url, model = %llm.model, "Using HTTP text generator");
            Arc::new(HttpTextGenerator::new(llm)?)
        }
    };

    tracing::info!(fps = config.fps, auto_fix = config.auto_fix, "Worker starting");
    let brain = Brain::new(generator).with_config(config);

    let bus = ProgressBus::default();
    let writer = spawn_progress_writer(&bus, Arc::clone(out));
    let outcome = brain.generate(&request, &bus).await;
    drop(bus);
    writer.await.context("progress writer stopped")?;

    Ok(outcome?)
}

/// Write the single terminal line. The error event is only written when no
/// result was produced; a failed result write is returned as is, so the
/// stream never carries two terminal lines.
fn finish<W: Write + Send>(
    out: &NdjsonWriter<W>,
    outcome: anyhow::Result<GenerationResult>,
) -> anyhow::Result<()> {
    match outcome {
        Ok(result) => out
            .write_event(&StreamEvent::result(result))
            .context("writing result event"),
        Err(e) => {
            out.write_event(&StreamEvent::error(format!("{e:#}")))
                .context("writing error event")?;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatforge_core::GenerationRequest;
    use beatforge_events::RecordingSink;

    const RESPONSE: &str = r#"{
      "concept": "Launch day",
      "emotionalArc": ["curious", "excited", "ready"],
      "scenes": [
        { "type": "HOOK", "beats": [{ "action": "reveal_headline", "text": "It's here" }] },
        { "type": "CTA", "beats": [{ "action": "show_cta", "text": "Get yours" }] }
      ]
    }"#;

    /// Accepts nothing; counts every write attempt.
    #[derive(Default)]
    struct ClosedPipe {
        attempts: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            self.attempts += 1;
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    async fn generated() -> GenerationResult {
        Brain::new(ScriptedTextGenerator::replying(RESPONSE))
            .generate(
                &GenerationRequest::new("A bold launch video for our new app"),
                &RecordingSink::default(),
            )
            .await
            .unwrap()
    }

    // -- finish -----------------------------------------------------------------

    #[tokio::test]
    async fn result_is_the_only_terminal_line() {
        let out = NdjsonWriter::new(Vec::new());
        finish(&out, Ok(generated().await)).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("{\"type\":\"result\""));
    }

    #[tokio::test]
    async fn failed_result_write_adds_no_error_line() {
        let out = NdjsonWriter::new(ClosedPipe::default());
        assert!(finish(&out, Ok(generated().await)).is_err());
        assert_eq!(out.into_inner().attempts, 1);
    }

    #[test]
    fn pipeline_failure_writes_one_error_line() {
        let out = NdjsonWriter::new(Vec::new());
        assert!(finish(&out, Err(anyhow::anyhow!("generator timed out"))).is_err());
        let text = String::from_utf8(out.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("\"type\":\"error\""));
        assert!(lines[0].contains("generator timed out"));
    }
}

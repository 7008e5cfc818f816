use anyhow::{Context, Result};
use std::io::Stdout;
use tokio::io::{AsyncBufReadExt, BufReader};
use voice_ledger::config::Config;
use voice_ledger::session::{Command, Flow, Session};
use voice_ledger::telemetry;
use voice_ledger::transcription::{self, TranscriptionError};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    telemetry::init(config.telemetry.enabled, &config.telemetry.log_path)?;
    tracing::info!("voice-ledger starting");

    let transcriber = match transcription::build_transcriber(&config.transcription) {
        Ok(transcriber) => transcriber,
        Err(err) => {
            tracing::warn!(error = %err, "voice input disabled");
            None
        }
    };

    let mut session = Session::new(config.display.clone(), transcriber, std::io::stdout());
    session.greet()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        session.prompt()?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    tracing::info!("input closed");
                    break;
                };
                if step(&mut session, &line).await? == Flow::Quit {
                    break;
                }
            }
        }
    }

    tracing::info!(records = session.ledger().len(), "voice-ledger exiting");
    Ok(())
}

/// Runs one input line
///
/// `voice` transcribes on a detached thread so Ctrl+C can end the session
/// without waiting for inference to finish.
async fn step(session: &mut Session<Stdout>, line: &str) -> Result<Flow> {
    let Some(command) = session.parse_line(line)? else {
        return Ok(Flow::Continue);
    };
    let Command::Voice { path } = command else {
        return session.execute(command).context("failed to write output");
    };
    let Some(transcriber) = session.voice_transcriber()? else {
        return Ok(Flow::Continue);
    };

    let (sender, receiver) = tokio::sync::oneshot::channel();
    std::thread::spawn(move || {
        // Receiver is gone only if the session already quit
        let _ = sender.send(transcription::transcribe_clip(transcriber.as_ref(), &path));
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received during transcription");
            Ok(Flow::Quit)
        }
        received = receiver => {
            let result = received.unwrap_or_else(|e| {
                Err(TranscriptionError::Inference(anyhow::anyhow!(
                    "transcription thread ended without a result: {e}"
                )))
            });
            session.apply_transcription(result)?;
            Ok(Flow::Continue)
        }
    }
}

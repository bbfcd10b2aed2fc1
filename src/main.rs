use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voice_relay::api::ApiServer;
use voice_relay::{Config, Pipeline, Responder, Synthesizer, Transcriber};

/// Voice Relay - speech in, speech out over a WebSocket
#[derive(Parser)]
#[command(name = "voice-relay", version, about)]
struct Cli {
    /// Address to bind (overrides config)
    #[arg(long, env = "VOICE_RELAY_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "VOICE_RELAY_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the relay server (default)
    Serve,
    /// Transcribe a WAV file with the configured STT provider
    Transcribe {
        /// Path to a WAV file
        file: PathBuf,
    },
    /// Ask the configured chat model a question
    Ask {
        /// Prompt text
        prompt: String,
    },
    /// Synthesize text with the configured TTS provider
    Speak {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
        /// Where to write the audio
        #[arg(short, long, default_value = "speech.mp3")]
        out: PathBuf,
    },
    /// Run the whole pipeline once on a WAV file
    Relay {
        /// Path to a WAV file
        file: PathBuf,
        /// Where to write the reply audio
        #[arg(short, long, default_value = "reply.mp3")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity; RUST_LOG wins when set
    let filter = match cli.verbose {
        0 => "info,voice_relay=info",
        1 => "info,voice_relay=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    // One-shot commands only need the stage they exercise
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, Pipeline::from_config(&config)?).await,
        Command::Transcribe { file } => {
            transcribe(&Transcriber::from_config(&config)?, &file).await
        }
        Command::Ask { prompt } => ask(&Responder::from_config(&config)?, &prompt).await,
        Command::Speak { text, out } => {
            speak(&Synthesizer::from_config(&config)?, &text, &out).await
        }
        Command::Relay { file, out } => {
            relay(&Pipeline::from_config(&config)?, &file, &out).await
        }
    }
}

/// Serve `/ws/audio` until interrupted
async fn serve(config: &Config, pipeline: Pipeline) -> anyhow::Result<()> {
    tracing::info!(
        addr = %config.bind_addr(),
        stage_timeout = ?config.server.stage_timeout,
        "starting voice relay"
    );

    ApiServer::new(Arc::new(pipeline), config.bind_addr())
        .run()
        .await?;

    Ok(())
}

/// Transcribe one file and print the text
async fn transcribe(transcriber: &Transcriber, file: &Path) -> anyhow::Result<()> {
    let audio = tokio::fs::read(file).await?;
    if let Some(info) = voice_relay::voice::probe_wav(&audio) {
        println!(
            "{} ch, {} Hz, {} bit, {:.2}s",
            info.channels, info.sample_rate, info.bits_per_sample, info.duration_secs
        );
    } else {
        println!("warning: {} does not look like a WAV file", file.display());
    }

    let text = transcriber.transcribe(&audio).await?;
    println!("{text}");
    Ok(())
}

/// Ask the chat model and print the reply
async fn ask(responder: &Responder, prompt: &str) -> anyhow::Result<()> {
    let reply = responder.respond(prompt).await?;
    println!("{reply}");
    Ok(())
}

/// Synthesize text to a file
async fn speak(synthesizer: &Synthesizer, text: &str, out: &Path) -> anyhow::Result<()> {
    println!("Synthesizing: \"{text}\"");
    let audio = synthesizer.synthesize(text).await?;
    tokio::fs::write(out, &audio).await?;
    println!("Wrote {} bytes to {}", audio.len(), out.display());
    Ok(())
}

/// Run the full pipeline on one file
async fn relay(pipeline: &Pipeline, file: &Path, out: &Path) -> anyhow::Result<()> {
    let audio = tokio::fs::read(file).await?;
    let reply = pipeline.process(&audio).await?;
    tokio::fs::write(out, &reply).await?;
    println!("Wrote {} bytes to {}", reply.len(), out.display());
    Ok(())
}

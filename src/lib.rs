//! Voice Relay - answers spoken audio with spoken audio over a WebSocket
//!
//! Each binary frame a client sends is one utterance. The relay turns it into
//! text, asks a language model for a reply, speaks the reply, and sends the
//! audio back as one binary frame.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │              Client (browser, app, ...)              │
//! └──────────────────────────┬───────────────────────────┘
//!                            │  /ws/audio (binary frames)
//! ┌──────────────────────────▼───────────────────────────┐
//! │                     Session loop                     │
//! │   Transcriber  ──▶  Responder  ──▶  Synthesizer      │
//! └──────┬───────────────────┬───────────────────┬───────┘
//!        │                   │                   │
//!   Whisper/Deepgram   OpenAI-compatible   ElevenLabs/OpenAI
//!                          chat API
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod session;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use llm::{ChatModel, Responder, strip_reasoning};
pub use pipeline::Pipeline;
pub use session::{AudioStream, Inbound, SessionState, SessionSummary, run_session};
pub use voice::{SpeechRecognizer, SpeechSynthesizer, Synthesizer, Transcriber};

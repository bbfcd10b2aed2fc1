//! Voice processing module
//!
//! Speech recognition and synthesis capabilities plus the stage wrappers the
//! pipeline drives.

pub mod stt;
pub mod tts;
mod wav;

pub use stt::{DeepgramRecognizer, Recognition, SpeechRecognizer, Transcriber, WhisperRecognizer};
pub use tts::{
    ElevenLabsSynthesizer, OpenAiSynthesizer, SpeechRequest, SpeechSynthesizer, Synthesizer,
};
pub use wav::{WavInfo, probe_wav, samples_to_wav};

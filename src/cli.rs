//! Command-line interface for subgen
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Media-to-subtitle transcription engine
#[derive(Parser, Debug)]
#[command(name = "subgen", version, about = "Media-to-subtitle transcription engine")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a media file into an SRT subtitle document
    Transcribe {
        /// Media file to transcribe
        input: PathBuf,

        /// Recognition engine (default: whisper-cpp)
        #[arg(long, value_name = "ENGINE")]
        engine: Option<String>,

        /// Whisper model (default: base, multilingual). Use base.en for English-only optimized
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Language code of the audio (default: auto-detect). Examples: auto, en, de, es, fr
        #[arg(long, value_name = "LANG")]
        language: Option<String>,

        /// Translate the finished subtitles into this language
        #[arg(long, value_name = "LANG")]
        translate_to: Option<String>,

        /// Audio stream to use when the container has several (0 = first)
        #[arg(long, value_name = "N", default_value_t = 0)]
        audio_track: u32,

        /// Skip subtitle quality post-processing
        #[arg(long)]
        no_post_processing: bool,

        /// Always transcribe, even when the container carries a text subtitle track
        #[arg(long)]
        no_embedded: bool,

        /// Copy the finished SRT to this path
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// List known models and which are present in the models directory
    Models,

    /// List translation target languages
    Languages,
}

//! Language Learning - LingQ lessons from your own vocabulary
//!
//! Generates graded-reader lessons for LingQ: a story written with the words
//! you already know, read aloud, and imported as a private lesson.
//!
//! # Overview
//!
//! A run goes through these steps in order:
//! - Fetch your vocabulary from LingQ (or reuse a cache younger than an hour)
//! - Decode LingQ's status fields into a 1-5 familiarity scale
//! - Ask an OpenAI chat model for a story and questions using familiar words
//! - Generate a thumbnail and synthesize the audio with Google Text-to-Speech
//! - Import text, audio and thumbnail into LingQ
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `vocabulary` - Terms, the status decoder and the word cache
//! - `lingq` - LingQ API client (vocabulary pages, lesson import)
//! - `story` - Story model and OpenAI generation
//! - `speech` - SSML rendering and text-to-speech
//! - `pipeline` - Step-by-step coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use language_learning::config::Settings;
//! use language_learning::pipeline::{Pipeline, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let result = pipeline.run(&RunOptions::default()).await?;
//!     println!("Imported '{}'", result.title);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod lingq;
pub mod openai;
pub mod pipeline;
pub mod speech;
pub mod story;
pub mod vocabulary;

pub use error::{LearningError, Result};

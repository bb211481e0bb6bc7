pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod session;
pub mod vocab;

pub use {
    config::{Config, Language, Task},
    error::WhisperError,
    models::{LayerCache, ModelPaths, ModelSet},
    service::Transcriber,
    session::{DecodeSession, Decoder, SessionState},
    vocab::Vocabulary,
};

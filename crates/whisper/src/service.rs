use {
    crate::{
        config::Config,
        error::{Result, WhisperError},
        models::{ModelPaths, ModelSet},
        session::DecodeSession,
        vocab::Vocabulary,
    },
    audio::AudioBuffer,
    std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

// One-at-a-time decode slot; freed on drop, including the failure path.
struct Permit {
    flag: Arc<AtomicBool>,
}

impl Permit {
    fn claim(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

struct Pipeline {
    models: ModelSet,
    vocab: Vocabulary,
    config: Config,
}

impl Pipeline {
    fn transcribe(&mut self, buffer: &AudioBuffer) -> Result<String> {
        let mono;
        let buffer = if buffer.channels > 1 {
            mono = buffer.downmix_to_mono();
            &mono
        } else {
            buffer
        };

        let spectrogram = self.models.extract_features(buffer)?;
        let encoder_state = self.models.encode(spectrogram)?;
        let decoder = self.models.decoder(encoder_state);
        let mut session = DecodeSession::new(decoder, &self.vocab, &self.config);
        session.run()?;
        log::debug!(
            "decode reached {:?} with {} buffered tokens",
            session.state(),
            session.tokens().len()
        );
        Ok(session.into_text())
    }
}

/// Speech-to-text service handle.
///
/// Owns the four loaded models and the vocabulary; both are built exactly
/// once by [`Transcriber::initialize`]. At most one decode session exists at
/// a time — a call arriving while another is in flight fails fast instead of
/// queueing.
#[derive(Clone)]
pub struct Transcriber {
    pipeline: Arc<Mutex<Pipeline>>,
    busy: Arc<AtomicBool>,
}

impl Transcriber {
    /// Load the four models and the vocabulary.
    pub fn initialize(config: Config, paths: &ModelPaths) -> Result<Self> {
        let vocab = Vocabulary::load(&paths.vocab)?;
        let models = ModelSet::load(paths, config.decoder_layers)?;
        log::info!(
            "transcription service ready ({} vocabulary entries)",
            vocab.len()
        );
        Ok(Self {
            pipeline: Arc::new(Mutex::new(Pipeline {
                models,
                vocab,
                config,
            })),
            busy: Arc::new(AtomicBool::new(false)),
        })
    }

    /// True when no decode session is currently active.
    pub fn is_ready(&self) -> bool {
        !self.busy.load(Ordering::Acquire)
    }

    /// Transcribe one captured buffer into text.
    ///
    /// Fails fast with [`WhisperError::NotReady`] while another call is in
    /// flight; nothing is allocated before the slot is claimed. An empty
    /// string is a valid result for silence-only input.
    pub async fn transcribe(&self, buffer: AudioBuffer) -> Result<String> {
        let permit = Permit::claim(&self.busy).ok_or(WhisperError::NotReady)?;
        let pipeline = Arc::clone(&self.pipeline);
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let mut pipeline = pipeline.lock().map_err(|error| {
                WhisperError::Model(format!("service state poisoned: {error}"))
            })?;
            pipeline.transcribe(&buffer)
        })
        .await
        .map_err(|error| WhisperError::Model(format!("transcription task failed: {error}")))?
    }
}

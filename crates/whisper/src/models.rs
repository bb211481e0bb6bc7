use {
    crate::{
        config::{N_SAMPLES, SAMPLE_RATE},
        error::{Result, WhisperError},
        session::Decoder,
    },
    audio::AudioBuffer,
    ort::{
        session::{Session, SessionInputValue, SessionOutputs, builder::GraphOptimizationLevel},
        value::{DynValue, TensorRef},
    },
    std::path::{Path, PathBuf},
};

// Tensor names of the four-model export
const AUDIO_INPUT: &str = "audio";
const LOG_MEL_OUTPUT: &str = "log_mel";
const FEATURES_INPUT: &str = "input_features";
const HIDDEN_STATE_OUTPUT: &str = "last_hidden_state";
const TOKENS_INPUT: &str = "input_ids";
const ENCODER_STATE_INPUT: &str = "encoder_hidden_states";
const LOGITS_OUTPUT: &str = "logits";

/// Files of the four-model export plus the vocabulary table.
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub spectrogram: PathBuf,
    pub encoder: PathBuf,
    pub decoder: PathBuf,
    pub decoder_past: PathBuf,
    pub vocab: PathBuf,
}

impl ModelPaths {
    /// Conventional file names under a single model directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            spectrogram: dir.join("logmel.onnx"),
            encoder: dir.join("encoder.onnx"),
            decoder: dir.join("decoder.onnx"),
            decoder_past: dir.join("decoder_past.onnx"),
            vocab: dir.join("vocab.json"),
        }
    }
}

/// Key/value attention tensors of one decoder layer, carried from the
/// cache-builder stage into the projector stage of the same step.
pub struct LayerCache {
    pub self_key: DynValue,
    pub self_value: DynValue,
    pub cross_key: DynValue,
    pub cross_value: DynValue,
}

// Tensor names for one decoder layer, precomputed at load time.
struct CacheNames {
    present_self_key: String,
    present_self_value: String,
    present_cross_key: String,
    present_cross_value: String,
    past_self_key: String,
    past_self_value: String,
    past_cross_key: String,
    past_cross_value: String,
}

impl CacheNames {
    fn layer(index: usize) -> Self {
        Self {
            present_self_key: format!("present.{index}.decoder.key"),
            present_self_value: format!("present.{index}.decoder.value"),
            present_cross_key: format!("present.{index}.encoder.key"),
            present_cross_value: format!("present.{index}.encoder.value"),
            past_self_key: format!("past_key_values.{index}.decoder.key"),
            past_self_value: format!("past_key_values.{index}.decoder.value"),
            past_cross_key: format!("past_key_values.{index}.encoder.key"),
            past_cross_value: format!("past_key_values.{index}.encoder.value"),
        }
    }
}

/// The four exported models, loaded once and reused across sessions.
///
/// The spectrogram and encoder stages each run once per transcription; the
/// decoder pair runs once per token. All four are opaque graphs addressed
/// purely by tensor name.
pub struct ModelSet {
    spectrogram: Session,
    encoder: Session,
    cache_builder: Session,
    projector: Session,
    cache_names: Vec<CacheNames>,
}

impl ModelSet {
    pub fn load(paths: &ModelPaths, decoder_layers: usize) -> Result<Self> {
        Ok(Self {
            spectrogram: load_session(&paths.spectrogram)?,
            encoder: load_session(&paths.encoder)?,
            cache_builder: load_session(&paths.decoder)?,
            projector: load_session(&paths.decoder_past)?,
            cache_names: (0..decoder_layers).map(CacheNames::layer).collect(),
        })
    }

    /// Convert a mono waveform into the fixed-shape log-mel spectrogram.
    ///
    /// Input is zero-padded or truncated to the 30 s window first, so the
    /// output shape never varies with clip length.
    pub fn extract_features(&mut self, buffer: &AudioBuffer) -> Result<DynValue> {
        if buffer.sample_rate != SAMPLE_RATE {
            return Err(WhisperError::Model(format!(
                "requires {SAMPLE_RATE} Hz audio, got {} Hz",
                buffer.sample_rate
            )));
        }
        if buffer.channels > 1 {
            return Err(WhisperError::Model(format!(
                "requires mono audio, got {} channels",
                buffer.channels
            )));
        }

        let samples = pad_or_truncate(&buffer.samples, N_SAMPLES);
        let audio = TensorRef::from_array_view(([1_i64, N_SAMPLES as i64], samples.as_slice()))?;
        let inputs: Vec<(String, SessionInputValue<'_>)> =
            vec![(AUDIO_INPUT.into(), SessionInputValue::from(audio))];
        let mut outputs = self.spectrogram.run(inputs)?;
        take_output(&mut outputs, LOG_MEL_OUTPUT)
    }

    /// One stateless forward pass through the acoustic encoder.
    pub fn encode(&mut self, spectrogram: DynValue) -> Result<DynValue> {
        let inputs: Vec<(String, SessionInputValue<'_>)> =
            vec![(FEATURES_INPUT.into(), SessionInputValue::from(spectrogram))];
        let mut outputs = self.encoder.run(inputs)?;
        take_output(&mut outputs, HIDDEN_STATE_OUTPUT)
    }

    /// Begin decoding against an encoder state.
    pub fn decoder(&mut self, encoder_state: DynValue) -> WhisperDecoder<'_> {
        WhisperDecoder {
            models: self,
            encoder_state,
        }
    }
}

/// Production [`Decoder`]: drives the exported decoder pair, holding the
/// encoder state for the lifetime of one session.
pub struct WhisperDecoder<'m> {
    models: &'m mut ModelSet,
    encoder_state: DynValue,
}

impl Decoder for WhisperDecoder<'_> {
    type Cache = LayerCache;

    fn build_caches(&mut self, prefix: &[i64]) -> Result<Vec<LayerCache>> {
        let models = &mut *self.models;
        let input_ids = TensorRef::from_array_view(([1_i64, prefix.len() as i64], prefix))?;
        let mut inputs: Vec<(String, SessionInputValue<'_>)> = Vec::with_capacity(2);
        inputs.push((TOKENS_INPUT.into(), SessionInputValue::from(input_ids)));
        inputs.push((
            ENCODER_STATE_INPUT.into(),
            SessionInputValue::from(&self.encoder_state),
        ));

        let mut outputs = models.cache_builder.run(inputs)?;
        let mut caches = Vec::with_capacity(models.cache_names.len());
        for names in &models.cache_names {
            caches.push(LayerCache {
                self_key: take_output(&mut outputs, &names.present_self_key)?,
                self_value: take_output(&mut outputs, &names.present_self_value)?,
                cross_key: take_output(&mut outputs, &names.present_cross_key)?,
                cross_value: take_output(&mut outputs, &names.present_cross_value)?,
            });
        }
        Ok(caches)
    }

    fn project(&mut self, last_token: i64, caches: Vec<LayerCache>) -> Result<Vec<f32>> {
        let models = &mut *self.models;
        let token = [last_token];
        let input_ids = TensorRef::from_array_view(([1_i64, 1_i64], &token[..]))?;
        let mut inputs: Vec<(String, SessionInputValue<'_>)> =
            Vec::with_capacity(1 + 4 * caches.len());
        inputs.push((TOKENS_INPUT.into(), SessionInputValue::from(input_ids)));
        for (names, cache) in models.cache_names.iter().zip(caches) {
            inputs.push((
                names.past_self_key.clone(),
                SessionInputValue::from(cache.self_key),
            ));
            inputs.push((
                names.past_self_value.clone(),
                SessionInputValue::from(cache.self_value),
            ));
            inputs.push((
                names.past_cross_key.clone(),
                SessionInputValue::from(cache.cross_key),
            ));
            inputs.push((
                names.past_cross_value.clone(),
                SessionInputValue::from(cache.cross_value),
            ));
        }

        let mut outputs = models.projector.run(inputs)?;
        let logits = take_output(&mut outputs, LOGITS_OUTPUT)?;
        drop(outputs);
        let (_, data) = logits.try_extract_tensor::<f32>()?;
        Ok(data.to_vec())
    }
}

fn load_session(path: &Path) -> Result<Session> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .commit_from_file(path)
        .map_err(|error| {
            WhisperError::Model(format!("failed to load {}: {error}", path.display()))
        })
}

fn take_output(outputs: &mut SessionOutputs<'_>, name: &str) -> Result<DynValue> {
    outputs
        .remove(name)
        .ok_or_else(|| WhisperError::Model(format!("model output '{name}' is missing")))
}

/// Fit a waveform to the fixed sample window, zero-padding short clips.
fn pad_or_truncate(samples: &[f32], window: usize) -> Vec<f32> {
    let mut fitted = samples[..samples.len().min(window)].to_vec();
    fitted.resize(window, 0.0);
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_or_truncate_fixes_the_window() {
        assert_eq!(pad_or_truncate(&[1.0, 2.0], 4), vec![1.0, 2.0, 0.0, 0.0]);
        assert_eq!(pad_or_truncate(&[1.0, 2.0, 3.0, 4.0, 5.0], 4).len(), 4);
        assert_eq!(pad_or_truncate(&[], 4), vec![0.0; 4]);
        let long = vec![1.0; N_SAMPLES + 5];
        assert_eq!(pad_or_truncate(&long, N_SAMPLES).len(), N_SAMPLES);
    }

    #[test]
    fn cache_names_follow_the_export_layout() {
        let names = CacheNames::layer(2);
        assert_eq!(names.present_self_key, "present.2.decoder.key");
        assert_eq!(names.present_cross_value, "present.2.encoder.value");
        assert_eq!(names.past_self_value, "past_key_values.2.decoder.value");
        assert_eq!(names.past_cross_key, "past_key_values.2.encoder.key");
    }

    #[test]
    fn model_paths_from_dir() {
        let paths = ModelPaths::from_dir("/models/tiny");
        assert!(paths.spectrogram.ends_with("logmel.onnx"));
        assert!(paths.decoder_past.ends_with("decoder_past.onnx"));
        assert!(paths.vocab.ends_with("vocab.json"));
    }
}

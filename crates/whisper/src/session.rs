use crate::{
    config::{Config, END_OF_TEXT, NO_TIMESTAMPS},
    error::Result,
    vocab::{TextAssembler, Vocabulary},
};

/// The two decoder stages of one decode step.
///
/// Stage 1 recomputes per-layer attention caches over the whole token prefix;
/// stage 2 projects the last sampled token against those caches into logits.
/// The production implementation drives the exported model pair; tests script
/// the stages directly.
pub trait Decoder {
    type Cache;

    /// Stage 1: per-layer key/value caches for the current prefix.
    fn build_caches(&mut self, prefix: &[i64]) -> Result<Vec<Self::Cache>>;

    /// Stage 2: logits over the vocabulary for the token after `last_token`.
    fn project(&mut self, last_token: i64, caches: Vec<Self::Cache>) -> Result<Vec<f32>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Stepping,
    Completed,
    Truncated,
}

/// One autoregressive transcription attempt.
///
/// The token buffer always starts with the control prefix (start-of-
/// transcript, language, task) and only grows; `last_token` holds the most
/// recently sampled id until the next step flushes it into the buffer. All
/// tensors the decoder produces live inside one step and are released with
/// it, and the whole session drops on any exit path.
pub struct DecodeSession<'v, D: Decoder> {
    decoder: D,
    vocab: &'v Vocabulary,
    tokens: Vec<i64>,
    last_token: i64,
    assembler: TextAssembler,
    text: String,
    max_tokens: usize,
    state: SessionState,
}

impl<'v, D: Decoder> DecodeSession<'v, D> {
    pub fn new(decoder: D, vocab: &'v Vocabulary, config: &Config) -> Self {
        let mut tokens = Vec::with_capacity(config.max_tokens);
        tokens.extend_from_slice(&config.control_prefix());
        let state = if tokens.len() >= config.max_tokens.saturating_sub(1) {
            SessionState::Truncated
        } else {
            SessionState::Stepping
        };
        Self {
            decoder,
            vocab,
            tokens,
            last_token: NO_TIMESTAMPS,
            assembler: TextAssembler::new(),
            text: String::new(),
            max_tokens: config.max_tokens,
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tokens(&self) -> &[i64] {
        &self.tokens
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Drive the session to a terminal state.
    ///
    /// On a model error the session is abandoned as-is; dropping it releases
    /// everything the decoder holds.
    pub fn run(&mut self) -> Result<()> {
        while self.state == SessionState::Stepping {
            self.step()?;
        }
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        let caches = self.decoder.build_caches(&self.tokens)?;
        let logits = self.decoder.project(self.last_token, caches)?;
        let next = argmax(&logits);

        // Flush the previous sample into the buffer before taking the new one.
        self.tokens.push(self.last_token);
        self.last_token = next;

        if next == END_OF_TEXT {
            self.state = SessionState::Completed;
            return Ok(());
        }
        if let Some(bytes) = self.vocab.decode(next) {
            self.assembler.push(&bytes, &mut self.text);
        }
        if self.tokens.len() >= self.max_tokens - 1 {
            self.state = SessionState::Truncated;
        }
        Ok(())
    }
}

/// Index of the largest logit.
fn argmax(logits: &[f32]) -> i64 {
    logits
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(index, _)| index as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_largest() {
        assert_eq!(argmax(&[0.0, 3.0, -1.0, 2.0]), 1);
        assert_eq!(argmax(&[f32::NAN, 1.0, 0.5]), 1);
        assert_eq!(argmax(&[]), 0);
    }
}

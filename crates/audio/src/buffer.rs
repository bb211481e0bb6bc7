/// Interleaved float samples captured from a microphone.
///
/// Samples are normalized to [-1, 1]. The buffer carries its own channel
/// count and sample rate; transforms return a new buffer rather than
/// mutating in place.
#[derive(Clone, Debug, Default)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: usize,
    pub channels: usize,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: usize, channels: usize) -> Self {
        Self {
            samples,
            sample_rate,
            channels: channels.max(1),
        }
    }

    pub fn empty(sample_rate: usize, channels: usize) -> Self {
        Self::new(Vec::new(), sample_rate, channels)
    }

    /// Number of sample frames (one frame = one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Remove long silent stretches while keeping natural pauses.
    ///
    /// A frame is silent when the channel-0 amplitude is below `threshold`.
    /// Silent runs shorter than `min_silence_secs` are kept; longer runs are
    /// dropped, as is any trailing silence. Non-silent frames are preserved
    /// in order with all their channels. Running the trim twice yields the
    /// same buffer.
    pub fn trim_silence(&self, threshold: f32, min_silence_secs: f32) -> AudioBuffer {
        let channels = self.channels.max(1);
        let min_silence_frames = (min_silence_secs * self.sample_rate as f32) as usize;
        let mut kept = Vec::with_capacity(self.samples.len());
        let mut silence_start: Option<usize> = None;

        for frame in 0..self.frames() {
            let amplitude = self.samples[frame * channels].abs();
            if amplitude < threshold {
                if silence_start.is_none() {
                    silence_start = Some(frame);
                }
                continue;
            }
            if let Some(start) = silence_start.take() {
                // Short pause: keep it, it reads as natural speech rhythm.
                if frame - start < min_silence_frames {
                    kept.extend_from_slice(&self.samples[start * channels..frame * channels]);
                }
            }
            kept.extend_from_slice(&self.samples[frame * channels..(frame + 1) * channels]);
        }

        AudioBuffer::new(kept, self.sample_rate, channels)
    }

    /// Average all channels of each frame into a single mono channel.
    pub fn downmix_to_mono(&self) -> AudioBuffer {
        if self.channels <= 1 {
            return self.clone();
        }
        let channels = self.channels;
        let frames = self.frames();
        let mut mono = Vec::with_capacity(frames);
        for frame in 0..frames {
            let sum: f32 = self.samples[frame * channels..(frame + 1) * channels]
                .iter()
                .sum();
            mono.push(sum / channels as f32);
        }
        AudioBuffer::new(mono, self.sample_rate, 1)
    }
}

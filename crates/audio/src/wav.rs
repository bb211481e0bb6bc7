use {
    crate::{buffer::AudioBuffer, error::AudioError},
    std::{
        path::Path,
        time::{SystemTime, UNIX_EPOCH},
    },
};

/// Write a buffer as a standard 16-bit PCM WAV file.
///
/// Float samples are clamped to [-1, 1] and scaled by 32767. This is a
/// debug export path only; nothing here reads WAV files back in.
pub fn save_wav(buffer: &AudioBuffer, path: impl AsRef<Path>) -> Result<(), AudioError> {
    let spec = hound::WavSpec {
        channels: buffer.channels.max(1) as u16,
        sample_rate: buffer.sample_rate as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in &buffer.samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * 32767.0) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Timestamped file name for a saved recording.
pub fn recording_file_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    format!("recording_{secs}.wav")
}

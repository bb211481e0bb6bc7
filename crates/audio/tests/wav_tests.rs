use {
    audio::{AudioBuffer, recording_file_name, save_wav},
    std::fs,
};

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[test]
fn wav_header_matches_pcm_layout() {
    let buffer = AudioBuffer::new(vec![0.0, 0.5, -0.5, 1.0], 16000, 1);
    let path = std::env::temp_dir().join("audio_wav_header_test.wav");
    save_wav(&buffer, &path).unwrap();
    let bytes = fs::read(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(u32_at(&bytes, 4) as usize, bytes.len() - 8);
    assert_eq!(&bytes[8..12], b"WAVE");

    assert_eq!(&bytes[12..16], b"fmt ");
    assert_eq!(u32_at(&bytes, 16), 16);
    assert_eq!(u16_at(&bytes, 20), 1); // PCM
    assert_eq!(u16_at(&bytes, 22), 1); // channels
    assert_eq!(u32_at(&bytes, 24), 16000); // sample rate
    assert_eq!(u32_at(&bytes, 28), 16000 * 2); // byte rate
    assert_eq!(u16_at(&bytes, 32), 2); // block align
    assert_eq!(u16_at(&bytes, 34), 16); // bits per sample

    assert_eq!(&bytes[36..40], b"data");
    assert_eq!(u32_at(&bytes, 40), 8);

    assert_eq!(i16::from_le_bytes([bytes[44], bytes[45]]), 0);
    assert_eq!(i16::from_le_bytes([bytes[46], bytes[47]]), 16383);
    assert_eq!(i16::from_le_bytes([bytes[48], bytes[49]]), -16383);
    assert_eq!(i16::from_le_bytes([bytes[50], bytes[51]]), 32767);
}

#[test]
fn wav_stereo_header_fields() {
    let buffer = AudioBuffer::new(vec![0.1, -0.1, 0.2, -0.2], 16000, 2);
    let path = std::env::temp_dir().join("audio_wav_stereo_test.wav");
    save_wav(&buffer, &path).unwrap();
    let bytes = fs::read(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(u16_at(&bytes, 22), 2); // channels
    assert_eq!(u32_at(&bytes, 28), 16000 * 2 * 2); // byte rate
    assert_eq!(u16_at(&bytes, 32), 4); // block align
}

#[test]
fn recording_file_names_are_wav() {
    let name = recording_file_name();
    assert!(name.starts_with("recording_"));
    assert!(name.ends_with(".wav"));
}

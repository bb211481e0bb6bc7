use {
    audio::AudioBuffer,
    whisper::{Config, ModelPaths, Transcriber, WhisperError},
};

fn model_paths() -> ModelPaths {
    let dir = std::env::var("WHISPER_MODEL_DIR").expect("set WHISPER_MODEL_DIR to the model export");
    ModelPaths::from_dir(dir)
}

#[tokio::test]
#[ignore = "requires the exported model files"]
async fn silence_transcribes_to_empty_text() {
    let transcriber = Transcriber::initialize(Config::tiny(), &model_paths()).unwrap();
    assert!(transcriber.is_ready());

    let silence = AudioBuffer::new(vec![0.0; 2 * 16000], 16000, 1);
    let silence = silence.trim_silence(0.02, 0.5);
    let text = transcriber.transcribe(silence).await.unwrap();

    assert!(text.trim().is_empty());
    assert!(transcriber.is_ready());
}

#[tokio::test]
#[ignore = "requires the exported model files"]
async fn concurrent_calls_fail_fast_with_not_ready() {
    let transcriber = Transcriber::initialize(Config::tiny(), &model_paths()).unwrap();
    let buffer = AudioBuffer::new(vec![0.01; 30 * 16000], 16000, 1);

    let busy = transcriber.clone();
    let first = tokio::spawn(async move { busy.transcribe(buffer).await });

    // Wait until the first call has claimed the decode slot.
    while transcriber.is_ready() && !first.is_finished() {
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }

    if !first.is_finished() {
        let second = transcriber
            .transcribe(AudioBuffer::new(vec![0.0; 16000], 16000, 1))
            .await;
        assert!(matches!(second, Err(WhisperError::NotReady)));
    }

    first.await.unwrap().unwrap();
    assert!(transcriber.is_ready());
}

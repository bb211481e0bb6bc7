use {
    audio::{AudioCapture, CaptureConfig, recording_file_name, save_wav},
    log::LevelFilter,
    std::time::Duration,
    whisper::{Config, ModelPaths, Transcriber},
};

struct StdoutLogger;

impl log::Log for StdoutLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        println!("[{}] {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StdoutLogger = StdoutLogger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Info);

    let mut args = std::env::args().skip(1);
    let Some(model_dir) = args.next() else {
        eprintln!("usage: dictate <model-dir> [seconds] [wav-dir]");
        std::process::exit(2);
    };
    let seconds: u64 = args.next().and_then(|arg| arg.parse().ok()).unwrap_or(5);
    let wav_dir = args.next();

    let transcriber = Transcriber::initialize(Config::tiny(), &ModelPaths::from_dir(&model_dir))?;

    let mut capture = AudioCapture::new(CaptureConfig::default());
    capture.start()?;
    log::info!("recording {seconds} seconds...");
    tokio::time::sleep(Duration::from_secs(seconds)).await;
    let buffer = capture.stop();
    log::info!("captured {:.1}s of audio", buffer.duration_secs());

    let buffer = buffer.trim_silence(0.02, 0.5).downmix_to_mono();
    if let Some(dir) = wav_dir {
        let path = std::path::Path::new(&dir).join(recording_file_name());
        save_wav(&buffer, &path)?;
        log::info!("saved recording to {}", path.display());
    }

    let text = transcriber.transcribe(buffer).await?;
    println!("{text}");
    Ok(())
}

pub mod buffer;
pub use buffer::AudioBuffer;

pub mod error;
pub use error::AudioError;

pub mod capture;
pub use capture::{AudioCapture, CaptureConfig, CaptureDevice};

pub mod wav;
pub use wav::{recording_file_name, save_wav};

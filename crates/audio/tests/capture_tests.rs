use audio::{AudioCapture, CaptureConfig, CaptureDevice};

#[test]
fn stop_without_start_returns_empty_buffer() {
    let mut capture = AudioCapture::new(CaptureConfig::default());
    let buffer = capture.stop();
    assert!(buffer.is_empty());
    assert_eq!(buffer.sample_rate, 16000);
    assert_eq!(buffer.channels, 1);
    assert!(!capture.is_recording());
}

#[test]
fn pick_device_prefers_substring_match() {
    let devices = vec![
        CaptureDevice {
            name: "alsa_input.pci-0000_00_1f.3".to_string(),
            description: "Built-in Audio".to_string(),
        },
        CaptureDevice {
            name: "alsa_input.usb-headset".to_string(),
            description: "USB Headset".to_string(),
        },
    ];

    let picked = AudioCapture::pick_device(&devices, Some("HEADSET")).unwrap();
    assert_eq!(picked.name, "alsa_input.usb-headset");

    let fallback = AudioCapture::pick_device(&devices, Some("missing")).unwrap();
    assert_eq!(fallback.name, "alsa_input.pci-0000_00_1f.3");

    let first = AudioCapture::pick_device(&devices, None).unwrap();
    assert_eq!(first.name, "alsa_input.pci-0000_00_1f.3");

    assert!(AudioCapture::pick_device(&[], None).is_none());
}

#[test]
#[ignore = "requires a capture device"]
fn record_until_stopped() {
    let mut capture = AudioCapture::new(CaptureConfig {
        max_duration_secs: 2,
        ..Default::default()
    });
    capture.start().unwrap();
    assert!(capture.is_recording());
    assert!(capture.start().is_err());
    std::thread::sleep(std::time::Duration::from_millis(500));
    let buffer = capture.stop();
    assert!(!capture.is_recording());
    assert!(!buffer.is_empty());
    assert!(buffer.frames() <= 2 * 16000);
}

#[test]
#[ignore = "requires a capture device"]
fn recording_auto_stops_at_capacity() {
    let mut capture = AudioCapture::new(CaptureConfig {
        max_duration_secs: 1,
        ..Default::default()
    });
    capture.start().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(1500));
    let buffer = capture.stop();
    assert_eq!(buffer.frames(), 16000);
}

#[tokio::test]
#[ignore = "requires a sound server"]
async fn list_devices_excludes_monitors() {
    let devices = AudioCapture::list_devices().await.unwrap();
    assert!(devices.iter().all(|device| !device.name.contains(".monitor")));
}

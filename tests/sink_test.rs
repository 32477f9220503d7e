use chrono::NaiveDate;
use image::{Rgb, RgbImage};
use octodash::config::{DisplayConfig, SinkKind};
use octodash::render::Frame;
use octodash::sink::{DisplaySink, FileSink, PanelSink, build_sink};

fn frame(w: u32, h: u32) -> Frame {
    Frame {
        image: RgbImage::from_pixel(w, h, Rgb([17, 24, 39])),
        rendered_at: NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(16, 45, 3)
            .unwrap(),
    }
}

#[test]
fn file_sink_writes_timestamped_png() {
    let tmp = tempfile::tempdir().unwrap();
    let mut sink = FileSink::new(tmp.path()).unwrap();
    sink.show(&frame(32, 24)).unwrap();

    let path = tmp.path().join("dashboard-20250115-164503.png");
    assert_eq!(sink.last_path(), Some(path.as_path()));
    let decoded = image::open(&path).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (32, 24));
    assert_eq!(decoded.get_pixel(0, 0).0, [17, 24, 39]);
}

#[test]
fn file_sink_never_overwrites() {
    let tmp = tempfile::tempdir().unwrap();
    let mut sink = FileSink::new(tmp.path()).unwrap();
    sink.show(&frame(4, 4)).unwrap();
    sink.show(&frame(4, 4)).unwrap();

    assert!(tmp.path().join("dashboard-20250115-164503.png").exists());
    assert!(tmp.path().join("dashboard-20250115-164503-1.png").exists());
}

#[test]
fn panel_sink_writes_rgb565_frame() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let mut sink = PanelSink::open(tmp.path(), 8, 2).unwrap();
    let mut yellow = frame(8, 2);
    yellow.image = RgbImage::from_pixel(8, 2, Rgb([255, 255, 0]));
    sink.show(&yellow).unwrap();
    sink.show(&yellow).unwrap();

    let bytes = std::fs::read(tmp.path()).unwrap();
    // Rewritten in place, not appended
    assert_eq!(bytes.len(), 8 * 2 * 2);
    assert_eq!(&bytes[..4], &[0xE0, 0xFF, 0xE0, 0xFF]);
}

#[test]
fn panel_sink_missing_device_fails() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(PanelSink::open(tmp.path().join("fb9"), 320, 240).is_err());
}

#[test]
fn builds_configured_sink() {
    let tmp = tempfile::tempdir().unwrap();
    let config = DisplayConfig {
        output_dir: tmp.path().join("out").to_string_lossy().to_string(),
        ..Default::default()
    };
    let sink = build_sink(&config).unwrap();
    assert_eq!(sink.name(), "file");
    assert!(tmp.path().join("out").is_dir());

    let fb = tempfile::NamedTempFile::new().unwrap();
    let config = DisplayConfig {
        sink: SinkKind::Panel,
        panel_device: fb.path().to_string_lossy().to_string(),
        ..Default::default()
    };
    assert_eq!(build_sink(&config).unwrap().name(), "panel");
}

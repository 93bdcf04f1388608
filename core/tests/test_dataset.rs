// Training directory → container → verification report.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use landmark_core::config::DatasetConfig;
    use landmark_core::container::{ContainerFile, FrameHeader, FRAME_OVERHEAD};
    use landmark_core::dataset::{build_container, scan_samples, verify_container, SkipReason};
    use landmark_core::types::DatasetError;
    use tempfile::tempdir;

    const JPEG: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0xff, 0xd9];

    fn landmark_text() -> String {
        (0..21).map(|j| format!("{},{:.3},{:.3},{:.3}\n", j, j as f32 / 21.0, 0.5, -0.1)).collect()
    }

    fn write_sample(dir: &Path, id: &str, image: &[u8], landmarks: Option<&str>) {
        fs::write(dir.join(format!("frame_{}.jpg", id)), image).unwrap();
        if let Some(text) = landmarks {
            fs::write(dir.join(format!("landmarks_{}.txt", id)), text).unwrap();
        }
    }

    #[test]
    fn scan_pairs_and_sorts() {
        let dir = tempdir().unwrap();
        write_sample(dir.path(), "010", JPEG, None);
        write_sample(dir.path(), "002", JPEG, None);
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("frame_003.png"), JPEG).unwrap();
        fs::create_dir(dir.path().join("frame_sub.jpg")).unwrap();

        let samples = scan_samples(dir.path(), &DatasetConfig::default()).unwrap();
        let stems: Vec<&str> = samples.iter().map(|s| s.stem.as_str()).collect();
        assert_eq!(stems, vec!["frame_002", "frame_010"]);
        assert_eq!(samples[0].landmark_path, dir.path().join("landmarks_002.txt"));
    }

    #[test]
    fn scan_honours_config() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("img-7.png"), JPEG).unwrap();
        let cfg = DatasetConfig {
            image_prefix: "img-".into(),
            image_extension: "png".into(),
            landmark_prefix: "pts-".into(),
            landmark_extension: "csv".into(),
            ..DatasetConfig::default()
        };
        let samples = scan_samples(dir.path(), &cfg).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].stem, "img-7");
        assert_eq!(samples[0].landmark_path, dir.path().join("pts-7.csv"));
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempdir().unwrap();
        let absent = dir.path().join("training");
        assert!(matches!(
            scan_samples(&absent, &DatasetConfig::default()),
            Err(DatasetError::MissingDirectory(p)) if p == absent
        ));
    }

    #[test]
    fn build_skips_unusable_samples_and_verifies_clean() {
        let dir = tempdir().unwrap();
        let training = dir.path().join("training");
        fs::create_dir(&training).unwrap();

        let good = landmark_text();
        write_sample(&training, "001", JPEG, Some(&good));
        write_sample(&training, "002", JPEG, None);
        write_sample(&training, "003", JPEG, Some("0,1,2,3\n"));
        write_sample(&training, "004", &[], Some(&good));
        write_sample(&training, "005", JPEG, Some(&good));

        let output = dir.path().join("training_data.tfrecord");
        let cfg = DatasetConfig::default();
        let report = build_container(&training, &output, &cfg).unwrap();

        assert_eq!(report.total, 5);
        assert_eq!(report.processed, 2);
        let reasons: Vec<(&str, &SkipReason)> =
            report.skipped.iter().map(|s| (s.stem.as_str(), &s.reason)).collect();
        assert_eq!(reasons.len(), 3);
        assert_eq!(reasons[0], ("frame_002", &SkipReason::MissingLandmarks));
        assert!(matches!(reasons[1], ("frame_003", SkipReason::InvalidLandmarks(_))));
        assert_eq!(reasons[2], ("frame_004", &SkipReason::EmptyImage));
        assert_eq!(report.telemetry.counters.frames_written, 2);
        assert_eq!(report.telemetry.counters.records_processed, 2);
        assert_eq!(report.telemetry.counters.records_skipped, 3);

        let verify = verify_container(&output, &cfg).unwrap();
        assert!(verify.is_clean());
        assert_eq!(verify.valid, 2);
        assert_eq!(verify.preview.len(), 2);
        assert_eq!(verify.preview[0].filename, "frame_001");
        assert_eq!(verify.preview[0].image_len, JPEG.len());
        assert_eq!(verify.preview[0].landmark_count, 63);
        assert_eq!(verify.preview[0].offset, 0);
        assert_eq!(verify.preview[1].filename, "frame_005");

        let file = ContainerFile::open(&output).unwrap();
        let first = file.records().unwrap().next().unwrap().unwrap();
        assert_eq!(first.image, JPEG);
        assert_eq!(first.landmarks.point(0), Some([0.0, 0.5, -0.1]));
    }

    #[test]
    fn preview_is_capped() {
        let dir = tempdir().unwrap();
        let good = landmark_text();
        for i in 0..8 {
            write_sample(dir.path(), &format!("{:03}", i), JPEG, Some(&good));
        }
        let output = dir.path().join("out.tfrecord");
        let cfg = DatasetConfig { preview_count: 3, ..DatasetConfig::default() };
        build_container(dir.path(), &output, &cfg).unwrap();

        let verify = verify_container(&output, &cfg).unwrap();
        assert_eq!(verify.valid, 8);
        assert_eq!(verify.preview.len(), 3);
        assert_eq!(verify.frames_seen(), 8);
    }

    #[test]
    fn verify_reports_corruption() {
        let dir = tempdir().unwrap();
        let good = landmark_text();
        for id in ["001", "002", "003"] {
            write_sample(dir.path(), id, JPEG, Some(&good));
        }
        let output = dir.path().join("out.tfrecord");
        let cfg = DatasetConfig::default();
        build_container(dir.path(), &output, &cfg).unwrap();

        let mut bytes = fs::read(&output).unwrap();
        let frame_len = bytes.len() / 3;
        assert_eq!(frame_len * 3, bytes.len());
        assert!(frame_len > FRAME_OVERHEAD);

        // payload of the second frame
        bytes[frame_len + FrameHeader::LEN + 1] ^= 0x40;
        fs::write(&output, &bytes).unwrap();
        let report = verify_container(&output, &cfg).unwrap();
        assert_eq!(report.valid, 2);
        assert_eq!(report.checksum_failures, 1);
        assert_eq!(report.telemetry.counters.records_processed, 2);
        assert_eq!(report.telemetry.counters.records_skipped, 1);
        assert!(report.terminal_error.is_none());
        assert!(!report.is_clean());

        // drop the last byte: third frame becomes truncated
        bytes.pop();
        fs::write(&output, &bytes).unwrap();
        let report = verify_container(&output, &cfg).unwrap();
        assert_eq!(report.valid, 1);
        assert!(report.terminal_error.is_some());
        assert_eq!(report.terminal_offset, Some(2 * frame_len as u64));
    }

    #[test]
    fn verify_rejects_invalid_config() {
        let dir = tempdir().unwrap();
        write_sample(dir.path(), "001", JPEG, Some(&landmark_text()));
        let output = dir.path().join("out.tfrecord");
        build_container(dir.path(), &output, &DatasetConfig::default()).unwrap();

        let cfg = DatasetConfig { max_payload_len: 0, ..DatasetConfig::default() };
        assert!(matches!(verify_container(&output, &cfg), Err(DatasetError::Config(_))));
    }

    #[test]
    fn verify_json_report() {
        let dir = tempdir().unwrap();
        write_sample(dir.path(), "001", JPEG, Some(&landmark_text()));
        let output = dir.path().join("out.tfrecord");
        let cfg = DatasetConfig::default();
        build_container(dir.path(), &output, &cfg).unwrap();

        let report = verify_container(&output, &cfg).unwrap();
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], 1);
        assert_eq!(json["preview"][0]["filename"], "frame_001");
        assert!(json["terminal_error"].is_null());
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "image_extension": "png", "progress_every": 2 }"#).unwrap();

        let cfg = DatasetConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.image_extension, "png");
        assert_eq!(cfg.progress_every, 2);
        assert_eq!(cfg.landmark_prefix, "landmarks_");

        fs::write(&path, r#"{ "progress_every": 0 }"#).unwrap();
        assert!(matches!(DatasetConfig::from_json_file(&path), Err(DatasetError::Config(_))));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(DatasetConfig::from_json_file(&path), Err(DatasetError::Config(_))));
    }
}

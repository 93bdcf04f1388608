// Record codec: schema mapping, arity and malformed input.

#[cfg(test)]
mod tests {
    use landmark_core::payload::{
        decode_example, decode_record, encode_example, encode_record, DecodeError, FeatureValue, LandmarkRecord,
        Landmarks,
    };
    use proptest::prelude::*;

    fn image() -> Vec<u8> {
        vec![0xff, 0xd8, 0xff, 0xd9]
    }

    fn floats(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32).collect()
    }

    fn features(landmarks: FeatureValue) -> Vec<(&'static str, FeatureValue)> {
        vec![
            ("image", FeatureValue::Bytes(vec![image()])),
            ("landmarks", landmarks),
            ("filename", FeatureValue::Bytes(vec![b"frame_001".to_vec()])),
        ]
    }

// # ✅ Reference record

    #[test]
    fn reference_record_roundtrips_field_by_field() {
        let landmarks = Landmarks::from_slice(&floats(63)).unwrap();
        let record = LandmarkRecord::new(image(), landmarks, "frame_001");

        let decoded = decode_record(&encode_record(&record)).unwrap();
        assert_eq!(decoded.filename, "frame_001");
        assert_eq!(decoded.image, vec![0xff, 0xd8, 0xff, 0xd9]);
        assert_eq!(decoded.landmarks.as_slice(), floats(63).as_slice());
        assert_eq!(decoded.landmarks.point(20), Some([60.0, 61.0, 62.0]));
    }

    #[test]
    fn features_are_written_in_stable_order() {
        let record = LandmarkRecord::new(image(), Landmarks::default(), "frame_001");
        let names: Vec<String> = decode_example(&record.encode())
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(names, vec!["image", "landmarks", "filename"]);
    }

    #[test]
    fn generic_and_typed_encoders_agree() {
        let record = LandmarkRecord::new(image(), Landmarks::from_slice(&floats(63)).unwrap(), "frame_001");
        let generic = encode_example(&features(FeatureValue::Floats(floats(63))));
        assert_eq!(generic, encode_record(&record));
    }

    #[test]
    fn empty_image_and_filename_roundtrip() {
        let record = LandmarkRecord::new(Vec::new(), Landmarks::default(), "");
        assert_eq!(LandmarkRecord::decode(&record.encode()).unwrap(), record);
    }

// # ❌ Arity

    #[test]
    fn wrong_landmark_count_is_rejected() {
        for n in [0usize, 62, 64, 126] {
            let payload = encode_example(&features(FeatureValue::Floats(floats(n))));
            assert_eq!(
                decode_record(&payload),
                Err(DecodeError::WrongArityLandmarks { expected: 63, actual: n })
            );
        }
    }

// # ❌ Schema violations

    #[test]
    fn missing_feature_is_reported() {
        let mut f = features(FeatureValue::Floats(floats(63)));
        f.retain(|(k, _)| *k != "filename");
        assert_eq!(
            decode_record(&encode_example(&f)),
            Err(DecodeError::MissingField("filename".into()))
        );
    }

    #[test]
    fn wrong_feature_kind_is_malformed() {
        let payload = encode_example(&features(FeatureValue::Bytes(vec![b"not floats".to_vec()])));
        assert!(matches!(
            decode_record(&payload),
            Err(DecodeError::MalformedField { field, .. }) if field == "landmarks"
        ));

        let payload = encode_example(&features(FeatureValue::Int64s(vec![1; 63])));
        assert!(matches!(decode_record(&payload), Err(DecodeError::MalformedField { .. })));
    }

    #[test]
    fn multiple_images_are_malformed() {
        let mut f = features(FeatureValue::Floats(floats(63)));
        f[0].1 = FeatureValue::Bytes(vec![image(), image()]);
        assert!(matches!(
            decode_record(&encode_example(&f)),
            Err(DecodeError::MalformedField { field, .. }) if field == "image"
        ));
    }

    #[test]
    fn non_utf8_filename_is_malformed() {
        let mut f = features(FeatureValue::Floats(floats(63)));
        f[2].1 = FeatureValue::Bytes(vec![vec![0xff, 0xfe]]);
        assert!(matches!(
            decode_record(&encode_example(&f)),
            Err(DecodeError::MalformedField { field, .. }) if field == "filename"
        ));
    }

    #[test]
    fn group_wire_type_is_malformed() {
        // field 1, wire type 3 (start group)
        assert!(matches!(decode_example(&[0x0b]), Err(DecodeError::MalformedField { .. })));
    }

    #[test]
    fn cut_payload_is_truncated() {
        let record = LandmarkRecord::new(image(), Landmarks::default(), "frame_001");
        let payload = record.encode();
        for cut in [1usize, 5, payload.len() / 2] {
            let short = &payload[..payload.len() - cut];
            assert!(
                matches!(decode_record(short), Err(DecodeError::Truncated { .. })),
                "cut {} not reported as truncated",
                cut
            );
        }
    }

    #[test]
    fn garbage_is_an_error_not_a_panic() {
        let over_long_varint = [0xffu8; 11];
        let over_long_length = [0x0a, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f];
        let field_zero = [0x00u8];
        for junk in [&over_long_varint[..], &over_long_length[..], &field_zero[..]] {
            assert!(decode_record(junk).is_err());
        }
    }

    #[test]
    fn empty_payload_misses_every_feature() {
        assert_eq!(decode_record(&[]), Err(DecodeError::MissingField("image".into())));
    }

// # 🔁 Properties

    fn arb_record() -> impl Strategy<Value = LandmarkRecord> {
        (
            proptest::collection::vec(any::<u8>(), 0..512),
            proptest::collection::vec(-1.0e6f32..1.0e6, 63),
            "[a-z0-9_]{0,24}",
        )
            .prop_map(|(image, values, name)| {
                LandmarkRecord::new(image, Landmarks::from_slice(&values).unwrap(), name)
            })
    }

    proptest! {
        #[test]
        fn record_roundtrip(record in arb_record()) {
            let back = decode_record(&encode_record(&record)).unwrap();
            prop_assert_eq!(back, record);
        }

        #[test]
        fn arbitrary_bytes_never_panic(buf in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = decode_record(&buf);
        }
    }
}

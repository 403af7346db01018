#[cfg(test)]
mod _tests_scan {
    use super::super::scan::{RotationScan, RotationScanSpec, Scan};
    use approx::assert_abs_diff_eq;

    const WIDTH: f64 = 0.5 * std::f64::consts::PI / 180.0;

    fn scan() -> RotationScan {
        RotationScan::new(RotationScanSpec {
            image_range: (1, 100),
            oscillation_start: 0.0,
            oscillation_width: WIDTH,
        })
        .expect("valid scan")
    }

    #[test]
    fn test_array_range_is_zero_based_half_open() {
        assert_eq!(scan().array_range(), (0, 100));
        assert_eq!(scan().num_images(), 100);

        let offset = RotationScan::new(RotationScanSpec {
            image_range: (11, 20),
            oscillation_start: 0.0,
            oscillation_width: WIDTH,
        })
        .unwrap();
        assert_eq!(offset.array_range(), (10, 20));
        assert_eq!(offset.num_images(), 10);
        assert_abs_diff_eq!(offset.angle_from_array_index(10.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_angle_and_index_mapping() {
        let s = scan();
        assert_abs_diff_eq!(s.angle_from_array_index(0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.angle_from_array_index(50.0), 25.0_f64.to_radians(), epsilon = 1e-12);
        assert_abs_diff_eq!(s.array_index_from_angle(25.0_f64.to_radians()), 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(s.array_index_from_angle(s.angle_from_array_index(12.3)), 12.3, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_scans_are_rejected() {
        let inverted = RotationScanSpec {
            image_range: (10, 1),
            oscillation_start: 0.0,
            oscillation_width: WIDTH,
        };
        assert!(RotationScan::new(inverted).is_err());

        let still = RotationScanSpec {
            image_range: (1, 10),
            oscillation_start: 0.0,
            oscillation_width: 0.0,
        };
        assert!(RotationScan::new(still).is_err());
    }

    #[test]
    fn test_scan_json() {
        let json = r#"{"image_range": [1, 100], "oscillation_start": 0.0, "oscillation_width": 0.008726646259971648}"#;
        let s: RotationScan = serde_json::from_str(json).unwrap();
        assert_eq!(s.image_range(), (1, 100));
        assert_abs_diff_eq!(s.oscillation().1, WIDTH, epsilon = 1e-15);
    }
}

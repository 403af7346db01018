#[cfg(test)]
mod _tests_beam {
    use super::super::beam::{Beam, MonochromaticBeam};
    use super::super::goniometer::{Goniometer, SingleAxisGoniometer};
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_s0_length_is_inverse_wavelength() {
        let beam = MonochromaticBeam::new(Vector3::new(0.0, 0.0, -2.0), 0.5).unwrap();
        assert_abs_diff_eq!(beam.s0(), Vector3::new(0.0, 0.0, -2.0), epsilon = 1e-12);
        assert_abs_diff_eq!(beam.direction.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_s0_round_trips() {
        let s0 = Vector3::new(0.1, -0.2, -1.1);
        let beam = MonochromaticBeam::from_s0(s0).unwrap();
        assert_abs_diff_eq!(beam.s0(), s0, epsilon = 1e-12);
        assert_abs_diff_eq!(beam.wavelength, 1.0 / s0.norm(), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_beams_are_rejected() {
        assert!(MonochromaticBeam::new(Vector3::zeros(), 1.0).is_err());
        assert!(MonochromaticBeam::new(Vector3::z(), 0.0).is_err());
        assert!(MonochromaticBeam::from_s0(Vector3::zeros()).is_err());
    }

    #[test]
    fn test_goniometer_axis_is_normalized() {
        let gonio = SingleAxisGoniometer::new(Vector3::new(3.0, 0.0, 4.0)).unwrap();
        assert_abs_diff_eq!(gonio.rotation_axis(), Vector3::new(0.6, 0.0, 0.8), epsilon = 1e-12);
        assert!(SingleAxisGoniometer::new(Vector3::zeros()).is_err());
    }

    #[test]
    fn test_beam_deserializes_from_json() {
        let beam: MonochromaticBeam =
            serde_json::from_str(r#"{"direction": [0.0, 0.0, -1.0], "wavelength": 0.9795}"#)
                .unwrap();
        assert_abs_diff_eq!(beam.s0().norm(), 1.0 / 0.9795, epsilon = 1e-12);
    }
}

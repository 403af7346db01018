#[cfg(test)]
mod _tests_ewald_projection {
    use super::super::ewald_projection::{ConicCoeffs, EwaldCirclePlaneProjection};
    use super::super::rotation::axis_and_angle_as_matrix;
    use approx::assert_abs_diff_eq;
    use nalgebra::{Matrix3, Vector3};

    // Panel 200 mm downstream of the sample, facing a beam along -z
    fn d_matrix() -> Matrix3<f64> {
        Matrix3::from_columns(&[
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(-50.0, 50.0, -200.0),
        ])
    }

    fn s0() -> Vector3<f64> {
        Vector3::new(0.0, 0.0, -1.0)
    }

    fn millimetres_of(d: &Matrix3<f64>, s1: &Vector3<f64>) -> (f64, f64) {
        let v = d.try_inverse().unwrap() * s1;
        assert!(v.z > 0.0);
        (v.x / v.z, v.y / v.z)
    }

    fn s1_at(d: &Matrix3<f64>, x: f64, y: f64) -> Vector3<f64> {
        (d * Vector3::new(x, y, 1.0)).normalize()
    }

    #[test]
    fn test_conic_passes_through_diffracted_beam() {
        let d = d_matrix();
        let projection = EwaldCirclePlaneProjection::new(s0(), d).unwrap();
        let s1 = s1_at(&d, 62.03, 41.07);
        let conic = projection.for_diffracted_beam(s1).unwrap();
        let scale = conic.0.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        assert!(conic.evaluate(62.03, 41.07).abs() < 1e-9 * scale);
    }

    #[test]
    fn test_conic_contains_whole_cone() {
        let d = d_matrix();
        let projection = EwaldCirclePlaneProjection::new(s0(), d).unwrap();
        let s1 = s1_at(&d, 62.03, 41.07);
        let conic = projection.for_diffracted_beam(s1).unwrap();
        let scale = conic.0.iter().fold(0.0_f64, |m, c| m.max(c.abs()));

        for angle in [0.5, 1.0, 2.0, 3.0] {
            let rotated = axis_and_angle_as_matrix(&s0(), angle) * s1;
            let (x, y) = millimetres_of(&d, &rotated);
            assert!(conic.evaluate(x, y).abs() < 1e-9 * scale);
        }
    }

    #[test]
    fn test_point_off_the_cone_is_not_on_conic() {
        let d = d_matrix();
        let projection = EwaldCirclePlaneProjection::new(s0(), d).unwrap();
        let conic = projection.for_diffracted_beam(s1_at(&d, 62.03, 41.07)).unwrap();
        let scale = conic.0.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        assert!(conic.evaluate(50.0, 50.0).abs() > 1e-6 * scale);
    }

    #[test]
    fn test_resolution_and_beam_forms_agree() {
        let d = d_matrix();
        let projection = EwaldCirclePlaneProjection::new(s0(), d).unwrap();
        let s1 = s1_at(&d, 62.03, 41.07);
        let from_beam = projection.for_diffracted_beam(s1).unwrap();
        let from_resolution = projection.for_resolution((s1 - s0()).norm());
        for (a, b) in from_beam.0.iter().zip(from_resolution.0.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_matrix_form_matches_evaluate() {
        let conic = ConicCoeffs([1.0, -2.0, 3.0, 0.5, -0.25, 4.0]);
        let q = conic.to_matrix();
        assert_eq!(q, q.transpose());
        let p = Vector3::new(1.5, -2.0, 1.0);
        assert_abs_diff_eq!(p.dot(&(q * p)), conic.evaluate(1.5, -2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_degenerate_vectors() {
        assert!(EwaldCirclePlaneProjection::new(Vector3::zeros(), d_matrix()).is_err());
        let projection = EwaldCirclePlaneProjection::new(s0(), d_matrix()).unwrap();
        assert!(projection.for_diffracted_beam(Vector3::zeros()).is_err());
        assert_eq!(projection.s0(), s0());
    }
}

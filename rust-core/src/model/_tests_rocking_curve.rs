#[cfg(test)]
mod _tests_rocking_curve {
    use super::super::rocking_curve::RockingCurveModel;
    use crate::interfaces::{ModelTerms, RockingCurveParams};
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;
    use statrs::function::erf::erf;
    use std::f64::consts::{FRAC_PI_4, SQRT_2};

    const TOL: f64 = 1e-12;

    // r = s1 - s0 = (-1, 1, 0) is perpendicular to the rotation axis
    fn model_with(params: RockingCurveParams, terms: ModelTerms) -> RockingCurveModel {
        RockingCurveModel::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            0.0,
            params,
            terms,
        )
        .expect("valid model")
    }

    fn model() -> RockingCurveModel {
        model_with(RockingCurveParams::new(100.0, 0.0, 0.0), ModelTerms::all())
    }

    #[test]
    fn test_thickness_and_resolution() {
        let m = model();
        assert_abs_diff_eq!(m.thickness(), 0.01, epsilon = TOL);
        assert_abs_diff_eq!(m.d(), 1.0 / SQRT_2, epsilon = TOL);
        assert_abs_diff_eq!(m.r(), Vector3::new(-1.0, 1.0, 0.0), epsilon = TOL);
        let expected = 2.0 * (0.01 / (2.0 * SQRT_2)).atan();
        assert_abs_diff_eq!(m.rocking_width(), expected, epsilon = TOL);
    }

    #[test]
    fn test_optional_terms() {
        let params = RockingCurveParams::new(100.0, 0.002, 0.01);
        let full = model_with(params, ModelTerms::all());
        assert_abs_diff_eq!(full.thickness(), 0.01 + 0.002 * SQRT_2, epsilon = TOL);
        let base = 2.0 * (full.thickness() / (2.0 * SQRT_2)).atan();
        assert_abs_diff_eq!(full.rocking_width(), base + 0.01, epsilon = TOL);
        assert_abs_diff_eq!(full.cap().angle(), 0.01, epsilon = TOL);

        let bare = model_with(params, ModelTerms::block_only());
        assert_abs_diff_eq!(bare.thickness(), 0.01, epsilon = TOL);
        assert_abs_diff_eq!(bare.rocking_width(), 2.0 * (0.01 / (2.0 * SQRT_2)).atan(), epsilon = TOL);
        assert_eq!(bare.cap().angle(), 0.0);
    }

    #[test]
    fn test_fraction_over_full_rocking_width() {
        let m = model();
        let f = m.intensity_fraction(m.phi0(), m.phi1()).unwrap();
        assert_abs_diff_eq!(f, erf(3.0 / SQRT_2), epsilon = 1e-9);
        assert_abs_diff_eq!(f, 0.9973, epsilon = 1e-4);
    }

    #[test]
    fn test_fraction_properties() {
        let m = model();
        let rw = m.rocking_width();
        // Whole real line
        assert_abs_diff_eq!(m.intensity_fraction(-10.0, 10.0).unwrap(), 1.0, epsilon = TOL);
        // Symmetric halves
        let lower = m.intensity_fraction(-rw, 0.0).unwrap();
        let upper = m.intensity_fraction(0.0, rw).unwrap();
        assert_abs_diff_eq!(lower, upper, epsilon = TOL);
        // Order of arguments does not matter
        assert_eq!(
            m.intensity_fraction(0.001, -0.002).unwrap(),
            m.intensity_fraction(-0.002, 0.001).unwrap()
        );
        // Empty interval
        assert_abs_diff_eq!(m.intensity_fraction(0.1, 0.1).unwrap(), 0.0, epsilon = TOL);
        // Grows with the interval
        let mut previous = 0.0;
        for i in 1..10 {
            let half = rw * i as f64 / 10.0;
            let f = m.intensity_fraction(-half, half).unwrap();
            assert!(f > previous && f <= 1.0);
            previous = f;
        }
    }

    #[test]
    fn test_fraction_non_decreasing_in_upper_limit() {
        let m = model();
        let rw = m.rocking_width();
        let phia = -0.7 * rw;
        let mut previous = 0.0;
        for i in 0..=40 {
            let phib = phia + rw * 2.0 * i as f64 / 40.0;
            let f = m.intensity_fraction(phia, phib).unwrap();
            assert!(f >= previous, "fraction fell from {} to {} at phib {}", previous, f, phib);
            assert!(f <= 1.0);
            previous = f;
        }
        assert!(previous > 0.9);
    }

    #[test]
    fn test_phi_range_for_perpendicular_axis() {
        let m = model();
        let (a, b) = m.phi_range().unwrap();
        let half = 0.5 * m.rocking_width();
        assert_abs_diff_eq!(a, -half, epsilon = 1e-9);
        assert_abs_diff_eq!(b, half, epsilon = 1e-9);
        assert_abs_diff_eq!(m.phi0(), -half, epsilon = TOL);
        assert_abs_diff_eq!(m.phi1(), half, epsilon = TOL);
    }

    #[test]
    fn test_phi_range_widens_near_axis() {
        // r makes an angle with the axis, so rotation moves it more slowly
        let tilted = RockingCurveModel::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(-1.0, 1.0, 1.0),
            0.0,
            RockingCurveParams::new(100.0, 0.0, 0.0),
            ModelTerms::all(),
        )
        .unwrap();
        let (a, b) = tilted.phi_range().unwrap();
        assert!(b - a > tilted.rocking_width());
        assert_abs_diff_eq!(a, -b, epsilon = TOL);
    }

    #[test]
    fn test_phi_range_on_axis_fails() {
        let m = RockingCurveModel::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(-1.0, 1.0, 0.0),
            0.0,
            RockingCurveParams::new(100.0, 0.0, 0.0),
            ModelTerms::all(),
        )
        .unwrap();
        assert!(m.phi_range().unwrap_err().is_precondition());
    }

    #[test]
    fn test_zero_reciprocal_vector_is_rejected() {
        let err = RockingCurveModel::new(
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            0.0,
            RockingCurveParams::new(100.0, 0.0, 0.0),
            ModelTerms::all(),
        )
        .unwrap_err();
        assert!(err.is_precondition());
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let build = |params| {
            RockingCurveModel::new(
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
                0.0,
                params,
                ModelTerms::all(),
            )
        };
        assert!(build(RockingCurveParams::new(0.0, 0.0, 0.0)).is_err());
        assert!(build(RockingCurveParams::new(100.0, -0.1, 0.0)).is_err());
        assert!(build(RockingCurveParams::new(100.0, 0.0, 4.0)).is_err());
    }

    #[test]
    fn test_diffracted_beam_is_rescaled() {
        let m = RockingCurveModel::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 5.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            0.0,
            RockingCurveParams::new(100.0, 0.0, 0.0),
            ModelTerms::all(),
        )
        .unwrap();
        assert_abs_diff_eq!(m.s1(), Vector3::new(0.0, 1.0, 0.0), epsilon = TOL);
    }

    #[test]
    fn test_shell_membership() {
        let m = model();
        let r = m.r();
        assert!(m.inside(r));
        assert!(m.inside(r * (1.0 + 0.004 / SQRT_2)));
        assert!(!m.inside(r * 1.1));
        assert_abs_diff_eq!(m.distance(r * 2.0), SQRT_2, epsilon = 1e-9);
    }

    #[test]
    fn test_axial_extents() {
        let m = model();
        assert_abs_diff_eq!(m.z1(), SQRT_2 + 0.005, epsilon = TOL);
        // No angular spread: the cap base is the tip of r
        assert_abs_diff_eq!(m.z0(), SQRT_2 - 0.005, epsilon = TOL);
    }

    #[test]
    fn test_ewald_intersection_angles() {
        let m = model();
        let (a, b) = m.ewald_intersection_angles().unwrap();
        assert!(a < b);
        // s1 makes 90 degrees with s0 and lies between the two angles
        assert!(a < 2.0 * FRAC_PI_4 && 2.0 * FRAC_PI_4 < b);
    }

    #[test]
    fn test_local_frame_is_orthonormal() {
        let m = model();
        let frame = m.local_frame();
        assert_abs_diff_eq!(frame.transpose() * frame, nalgebra::Matrix3::identity(), epsilon = TOL);
        assert_abs_diff_eq!(frame.determinant(), 1.0, epsilon = TOL);
        assert_abs_diff_eq!(frame.column(2).into_owned(), m.r().normalize(), epsilon = TOL);
    }

    #[test]
    fn test_minimum_box_contains_shell() {
        let m = model_with(RockingCurveParams::new(50.0, 0.001, 0.02), ModelTerms::all());
        let corners = m.minimum_box();
        let frame = m.local_frame();
        let local: Vec<_> = corners.iter().map(|c| frame.transpose() * c).collect();
        let lower = local.iter().fold(local[0], |acc, p| acc.inf(p));
        let upper = local.iter().fold(local[0], |acc, p| acc.sup(p));

        let half_angle = 0.5 * m.rocking_width();
        let rl = m.r().norm();
        for i in 0..=4 {
            let rho = rl - 0.5 * m.thickness() + m.thickness() * i as f64 / 4.0;
            for j in 0..=4 {
                let theta = half_angle * j as f64 / 4.0;
                for k in 0..8 {
                    let phi = k as f64 * std::f64::consts::PI / 4.0;
                    let p = Vector3::new(
                        rho * theta.sin() * phi.cos(),
                        rho * theta.sin() * phi.sin(),
                        rho * theta.cos(),
                    );
                    for axis in 0..3 {
                        assert!(p[axis] >= lower[axis] - TOL && p[axis] <= upper[axis] + TOL);
                    }
                }
            }
        }
        // Tip of r sits on the top face
        assert_abs_diff_eq!(upper.z, rl + 0.5 * m.thickness(), epsilon = TOL);
    }
}

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};

/// Right-handed rotation matrix for `angle` radians about `axis`.
///
/// The axis does not need to be normalized; a zero axis yields the identity.
pub fn axis_and_angle_as_matrix(axis: &Vector3<f64>, angle: f64) -> Matrix3<f64> {
    match Unit::try_new(*axis, 0.0) {
        Some(unit) => Rotation3::from_axis_angle(&unit, angle).into_inner(),
        None => Matrix3::identity(),
    }
}

/// Two unit vectors completing `unit` to a right-handed orthonormal basis `(v2, v3, unit)`.
///
/// The first vector is built from whichever of the x/z components dominates, so the
/// cross products never degenerate for axis-aligned inputs.
pub fn perpendicular_basis(unit: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let v2 = if unit.x.abs() > unit.z.abs() {
        Vector3::new(-unit.y, unit.x, 0.0)
    } else {
        Vector3::new(0.0, -unit.z, unit.y)
    }
    .normalize();
    let v3 = unit.cross(&v2);
    (v2, v3)
}

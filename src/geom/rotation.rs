use crate::geom::IsClose;
use crate::geom::vector::Vector;
use ndarray as nd;

/// Calculate rotation matrix for a unit vector `u` and angle `phi` (radians).
///
/// Uses the Rodrigues form, which is numerically stable:
/// `R = I + sin(phi) W + 2 sin^2(phi/2) W^2` where `W` is the cross-product
/// matrix of `u`.
pub fn rotation_matrix(u: &Vector, phi: f64) -> nd::Array2<f64> {
    if !u.length().is_close(1.) {
        panic!("rotation_matrix() requires u to be a unit vector");
    }

    let w: nd::Array2<f64> = nd::arr2(&[[0., -u.dz, u.dy], [u.dz, 0., -u.dx], [-u.dy, u.dx, 0.]]);

    nd::Array::eye(3) + phi.sin() * &w + (2. * (phi / 2.).sin().powi(2)) * w.dot(&w)
}

/// Rotate a single vector with the rotation matrix `rot`.
pub fn rotate_vector(v: &Vector, rot: &nd::Array2<f64>) -> Vector {
    let col = nd::arr1(&[v.dx, v.dy, v.dz]);
    let out = rot.dot(&col);
    Vector::new(out[0], out[1], out[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_rotation_about_z() {
        let rot = rotation_matrix(&Vector::unit_z(), PI / 2.);
        let v = rotate_vector(&Vector::unit_x(), &rot);
        assert!(v.is_close(&Vector::unit_y()));
    }

    #[test]
    fn test_rotation_about_y() {
        let rot = rotation_matrix(&Vector::unit_y(), -PI / 2.);
        let v = rotate_vector(&Vector::unit_x(), &rot);
        assert!(v.is_close(&Vector::unit_z()));
    }

    #[test]
    #[should_panic]
    fn test_non_unit_axis_panics() {
        rotation_matrix(&Vector::new(0., 0., 2.), 1.0);
    }
}

use crate::geom::rotation::{rotate_vector, rotation_matrix};
use crate::geom::vector::Vector;
use ndarray as nd;

/// Rigid placement transform: rotation followed by translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    rot: nd::Array2<f64>,
    trans: Vector,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            rot: nd::Array::eye(3),
            trans: Vector::zero(),
        }
    }

    /// Pure translation.
    pub fn translation(trans: Vector) -> Self {
        Self {
            rot: nd::Array::eye(3),
            trans,
        }
    }

    /// Rotation about a unit axis, no translation.
    pub fn rotation(axis: &Vector, phi: f64) -> Self {
        Self {
            rot: rotation_matrix(axis, phi),
            trans: Vector::zero(),
        }
    }

    /// Returns `self` followed-by-translation `trans` (rotation unchanged).
    pub fn with_translation(mut self, trans: Vector) -> Self {
        self.trans = trans;
        self
    }

    /// Composition: applies `other` first, then `self`.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rot: self.rot.dot(&other.rot),
            trans: rotate_vector(&other.trans, &self.rot) + self.trans,
        }
    }

    /// Maps a point (given as a displacement from the parent origin).
    pub fn apply(&self, v: &Vector) -> Vector {
        rotate_vector(v, &self.rot) + self.trans
    }

    pub fn translation_part(&self) -> Vector {
        self.trans
    }

    pub fn rotation_part(&self) -> &nd::Array2<f64> {
        &self.rot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_identity_apply() {
        let t = Transform::identity();
        let v = Vector::new(1., 2., 3.);
        assert!(t.apply(&v).is_close(&v));
    }

    #[test]
    fn test_rotation_with_translation() {
        let t = Transform::rotation(&Vector::unit_z(), PI / 2.)
            .with_translation(Vector::new(10., 0., 0.));
        let v = t.apply(&Vector::unit_x());
        assert!(v.is_close(&Vector::new(10., 1., 0.)));
    }

    #[test]
    fn test_rotation_part_is_orthonormal() {
        let t = Transform::rotation(&Vector::unit_z(), 0.7)
            .compose(&Transform::rotation(&Vector::unit_x(), PI / 2.));
        let r = t.rotation_part();
        let rt_r = r.t().dot(r);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1. } else { 0. };
                assert!((rt_r[[i, j]] - expected).abs() < 1e-12);
            }
        }
        assert!(t.translation_part().is_close(&Vector::zero()));
    }

    #[test]
    fn test_compose_order() {
        // Rotate about z by 90 deg, then translate along x.
        let rot = Transform::rotation(&Vector::unit_z(), PI / 2.);
        let shift = Transform::translation(Vector::new(5., 0., 0.));
        let both = shift.compose(&rot);
        let v = both.apply(&Vector::unit_x());
        assert!(v.is_close(&Vector::new(5., 1., 0.)));
    }
}

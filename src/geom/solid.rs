/// Solid primitives requested by the barrel construction.
///
/// All dimensions are half-extents in millimetres, matching the usual
/// detector-geometry convention for box-like shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Solid {
    /// Rectangular box with half-extents `(dx, dy, dz)`.
    Cuboid { dx: f64, dy: f64, dz: f64 },
    /// Prism with a trapezoidal x-z cross-section: half-width `top_x` at
    /// local `-z`, half-width `bottom_x` at local `+z`, half-length `dy`,
    /// half-depth `dz`.
    Trapezoid {
        top_x: f64,
        bottom_x: f64,
        dy: f64,
        dz: f64,
    },
    /// Regular-polygon barrel ring: `nsides` flats between inner apothem
    /// `rmin` and outer apothem `rmax`, half-length `dz` along the axis.
    PolyhedraBarrel {
        nsides: u32,
        rmin: f64,
        rmax: f64,
        dz: f64,
    },
}

impl Solid {
    /// Volume of the solid in cubic millimetres.
    pub fn volume(&self) -> f64 {
        match *self {
            Solid::Cuboid { dx, dy, dz } => 8. * dx * dy * dz,
            Solid::Trapezoid {
                top_x,
                bottom_x,
                dy,
                dz,
            } => (top_x + bottom_x) * 2. * dy * 2. * dz,
            Solid::PolyhedraBarrel {
                nsides,
                rmin,
                rmax,
                dz,
            } => {
                let half_angle = std::f64::consts::PI / nsides as f64;
                nsides as f64 * half_angle.tan() * (rmax.powi(2) - rmin.powi(2)) * 2. * dz
            }
        }
    }

    /// Half-extent along the local z (depth/stacking) axis.
    pub fn half_depth(&self) -> f64 {
        match *self {
            Solid::Cuboid { dz, .. } => dz,
            Solid::Trapezoid { dz, .. } => dz,
            Solid::PolyhedraBarrel { dz, .. } => dz,
        }
    }
}

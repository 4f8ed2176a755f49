use crate::barrel::config::BarrelConfig;
use crate::error::CaloError;
use std::f64::consts::{FRAC_PI_4, PI};
use tracing::debug;

/// Trapezoidal cross-section that must contain the full layer stack.
///
/// The stack depth cannot be known before the layer expansion is summed, so
/// this runs the same accumulation as the stack walk (a first pass) and sizes
/// the widths from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleEnvelope {
    /// Full width of the inner (wide) face.
    pub bottom_width: f64,
    /// Full width of the outer (narrow) face.
    pub top_width: f64,
    pub axial_half_length: f64,
    pub depth_half_thickness: f64,
}

impl ModuleEnvelope {
    /// Sizes the envelope for a validated configuration.
    ///
    /// `top_width = bottom_width - 2 * thickness` by construction; a
    /// non-positive top width means the stack is thicker than the radial
    /// budget allows and aborts the build.
    pub fn derive(cfg: &BarrelConfig) -> Result<Self, CaloError> {
        let thickness = Self::stack_thickness(cfg);
        let half_angle = PI / cfg.nsides as f64;
        let bottom_width = 2. * half_angle.tan() * cfg.inner_radius + thickness / FRAC_PI_4.sin();
        let top_width = bottom_width - 2. * thickness;

        debug!("module_thickness = {thickness}");
        debug!("bottom_dim_x = {bottom_width}");
        debug!("top_dim_x = {top_width}");

        if top_width <= 0. {
            return Err(CaloError::not_physical(
                &cfg.name,
                "module top width",
                top_width,
            ));
        }
        Ok(Self {
            bottom_width,
            top_width,
            axial_half_length: cfg.module_dim_z() / 2.,
            depth_half_thickness: thickness / 2.,
        })
    }

    /// Total stack depth: floor allowance, every layer, every structural
    /// plate with its fiber clearances, and the outer support shell.
    pub fn stack_thickness(cfg: &BarrelConfig) -> f64 {
        let clearance = cfg.structure_clearance();
        let mut depth = cfg.floor_allowance();
        for (_, spec, has_plate) in cfg.expanded_layers() {
            depth += spec.thickness();
            if has_plate {
                depth += spec.radiator_thickness + 2. * clearance;
            }
        }
        depth + cfg.support_thickness
    }

    pub fn module_thickness(&self) -> f64 {
        2. * self.depth_half_thickness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stack_thickness_reference() {
        let cfg = BarrelConfig::reference().unwrap();
        // floor 1.45 + layers 190.635 + radiators 117.6
        // + 38 plates * 1.5 clearance + support 2.5
        assert_relative_eq!(
            ModuleEnvelope::stack_thickness(&cfg),
            369.185,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_width_relation_is_exact() {
        let cfg = BarrelConfig::reference().unwrap();
        let env = ModuleEnvelope::derive(&cfg).unwrap();
        let t = env.module_thickness();
        assert_eq!(env.top_width, env.bottom_width - 2. * t);
        assert!(env.top_width > 0.);
        assert!(env.bottom_width > env.top_width);
    }

    #[test]
    fn test_width_formula() {
        let cfg = BarrelConfig::reference().unwrap();
        let env = ModuleEnvelope::derive(&cfg).unwrap();
        let t = ModuleEnvelope::stack_thickness(&cfg);
        let expected = 2. * (PI / 8.).tan() * cfg.inner_radius + t / FRAC_PI_4.sin();
        assert_relative_eq!(env.bottom_width, expected, max_relative = 1e-15);
    }

    #[test]
    fn test_stack_thicker_than_radial_budget_is_fatal() {
        let mut cfg = BarrelConfig::reference().unwrap();
        cfg.inner_radius = 10.0;
        let err = ModuleEnvelope::derive(&cfg).unwrap_err();
        assert!(matches!(err, CaloError::GeometricInconsistency { .. }));
    }
}

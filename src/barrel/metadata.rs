use crate::barrel::config::BarrelConfig;
use crate::barrel::envelope::ModuleEnvelope;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Per-layer summary for particle-shower reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaloLayerRecord {
    /// Radial distance of the layer's inner face from the IP, in mm.
    pub distance: f64,
    /// Layer thickness plus the following absorber plate.
    pub thickness: f64,
    pub absorber_thickness: f64,
    /// Transverse readout cell pitch, first direction.
    pub cell_size0: f64,
    /// Transverse readout cell pitch, second direction.
    pub cell_size1: f64,
}

/// Radial/axial extent of the barrel in the r-z plane, in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub rmin: f64,
    pub rmax: f64,
    pub zmin: f64,
    pub zmax: f64,
}

/// Read-only reconstruction summary: barrel topology, extent, and one record
/// per sampled layer, ordered inner to outer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredCaloData {
    pub is_barrel: bool,
    pub nsides: u32,
    pub phi0: f64,
    pub extent: Extent,
    pub layers: Vec<CaloLayerRecord>,
}

impl LayeredCaloData {
    pub fn new(cfg: &BarrelConfig, env: &ModuleEnvelope) -> Self {
        let half_angle = PI / cfg.nsides as f64;
        Self {
            is_barrel: true,
            nsides: cfg.nsides,
            phi0: 0.,
            extent: Extent {
                rmin: cfg.inner_radius,
                rmax: (cfg.inner_radius + env.module_thickness()) / half_angle.cos(),
                zmin: 0.,
                zmax: cfg.barrel_half_z,
            },
            layers: Vec::new(),
        }
    }

    /// Appends the next record outward. Order is significant: consumers rely
    /// on radial monotonicity.
    pub(crate) fn push_layer(&mut self, record: CaloLayerRecord) {
        self.layers.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent() {
        let cfg = BarrelConfig::reference().unwrap();
        let env = ModuleEnvelope::derive(&cfg).unwrap();
        let data = LayeredCaloData::new(&cfg, &env);
        assert_eq!(data.extent.rmin, 1800.0);
        assert_eq!(data.extent.zmin, 0.0);
        assert_eq!(data.extent.zmax, 2350.0);
        let expected_rmax = (1800.0 + env.module_thickness()) / (PI / 8.).cos();
        assert!((data.extent.rmax - expected_rmax).abs() < 1e-12);
        assert!(data.is_barrel);
        assert_eq!(data.nsides, 8);
        assert_eq!(data.phi0, 0.0);
    }

    #[test]
    fn test_serialization() {
        let cfg = BarrelConfig::reference().unwrap();
        let env = ModuleEnvelope::derive(&cfg).unwrap();
        let mut data = LayeredCaloData::new(&cfg, &env);
        data.push_layer(CaloLayerRecord {
            distance: 1801.45,
            thickness: 5.965,
            absorber_thickness: 2.1,
            cell_size0: 5.1,
            cell_size1: 5.1,
        });
        let json = serde_json::to_string(&data).unwrap();
        let back: LayeredCaloData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }
}

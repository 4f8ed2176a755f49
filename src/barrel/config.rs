use crate::error::CaloError;
use crate::material::MaterialRole;
use crate::params::ParameterSet;
use serde::{Deserialize, Serialize};

/// Fiber sheets wrapping each structural tungsten plate (per side).
pub const N_FIBERS_W_STRUCTURE: u32 = 2;
/// Fiber sheets wrapping each alveolus (per side).
pub const N_FIBERS_ALVEOLUS: u32 = 3;
/// Axial module multiplicity per barrel; fixed in this layout.
pub const MODULE_COUNT: u32 = 5;

/// The finest-grained material sheet within a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceSpec {
    /// Sheet thickness in mm.
    pub thickness: f64,
    /// Material token name, resolved by the material collaborator.
    pub material: String,
    pub role: MaterialRole,
    /// Marks the slice volume for external readout assignment.
    pub sensitive: bool,
}

impl SliceSpec {
    pub fn new(thickness: f64, material: &str, role: MaterialRole) -> Self {
        Self {
            thickness,
            material: material.to_string(),
            role,
            sensitive: false,
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// One layer technology: a repeat count plus the ordered slice stack of a
/// single layer, with the nominal radiator plate thickness that follows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTypeSpec {
    pub repeat: u32,
    /// Nominal thickness of the structural radiator plate between layers of
    /// this technology, in mm.
    pub radiator_thickness: f64,
    pub slices: Vec<SliceSpec>,
    /// Visualization tag copied onto the layer and plate volumes; assignment
    /// semantics are external.
    pub vis: Option<String>,
}

impl LayerTypeSpec {
    pub fn new(repeat: u32, radiator_thickness: f64, slices: Vec<SliceSpec>) -> Self {
        Self {
            repeat,
            radiator_thickness,
            slices,
            vis: None,
        }
    }

    /// Standard silicon alveolus package: readout slab stacked against the
    /// in-layer radiator sheet.
    pub fn alveolus(
        repeat: u32,
        slab: &SlabLayup,
        radiator_thickness: f64,
        radiator_material: &str,
    ) -> Self {
        let slices = vec![
            SliceSpec::new(slab.shielding, "steel235", MaterialRole::Structural),
            SliceSpec::new(slab.copper, "copper", MaterialRole::Other),
            SliceSpec::new(slab.pcb, "g10", MaterialRole::Other),
            SliceSpec::new(slab.glue_gap, "glue", MaterialRole::Other),
            SliceSpec::new(slab.sensor, "silicon", MaterialRole::Sensor).sensitive(),
            SliceSpec::new(slab.ground, "copper", MaterialRole::Other),
            SliceSpec::new(slab.air_gap / 2., "air", MaterialRole::Other),
            SliceSpec::new(radiator_thickness, radiator_material, MaterialRole::Absorber),
        ];
        Self::new(repeat, radiator_thickness, slices)
    }

    /// Layer thickness: the sum of its slice thicknesses.
    pub fn thickness(&self) -> f64 {
        self.slices.iter().map(|s| s.thickness).sum()
    }
}

/// Silicon readout-slab layup constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlabLayup {
    pub shielding: f64,
    pub copper: f64,
    pub pcb: f64,
    pub glue_gap: f64,
    pub sensor: f64,
    pub ground: f64,
    /// Full alveolus air gap; each slab carries half of it.
    pub air_gap: f64,
    /// H-structure fiber sheet thickness.
    pub h_fiber: f64,
}

/// Scintillator readout-slab layup constants (alternative technology; shares
/// shielding, copper and air gap with the silicon layup).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScSlabLayup {
    pub pcb: f64,
    pub scintillator: f64,
    pub reflector: f64,
}

/// All physical-design constants of the barrel, resolved and typed.
///
/// Assembled once at the boundary from a [`ParameterSet`]; after that, no
/// stringly lookups happen anywhere in the construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarrelConfig {
    pub name: String,
    pub inner_radius: f64,
    pub barrel_half_z: f64,
    pub nsides: u32,
    pub tower_count: u32,
    /// Transverse readout cell pitch, recorded per layer for reconstruction.
    pub cell_size: f64,
    pub fiber_thickness: f64,
    pub support_thickness: f64,
    pub front_face_thickness: f64,
    pub lateral_face_thickness: f64,
    pub slab: SlabLayup,
    pub sc_slab: ScSlabLayup,
    /// Material of the structural radiator plates.
    pub stave_material: String,
    /// Visualization tag for the module volume.
    pub stave_vis: Option<String>,
    /// Numeric slack subtracted from box dimensions; default 0.
    pub tolerance: f64,
    pub layer_types: Vec<LayerTypeSpec>,
}

impl BarrelConfig {
    /// Resolves every named constant out of `params`. A missing or mistyped
    /// name aborts here, before any geometry math runs.
    pub fn from_params(
        params: &ParameterSet,
        stave_material: &str,
        layer_types: Vec<LayerTypeSpec>,
    ) -> Result<Self, CaloError> {
        let slab = SlabLayup {
            shielding: params.real("slab_shielding")?,
            copper: params.real("slab_copper_thickness")?,
            pcb: params.real("slab_pcb_thickness")?,
            glue_gap: params.real("slab_glue_gap")?,
            sensor: params.real("si_thickness")?,
            ground: params.real("slab_ground_thickness")?,
            air_gap: params.real("alveolus_air_gap")?,
            h_fiber: params.real("slab_h_fiber_thickness")?,
        };
        let sc_slab = ScSlabLayup {
            pcb: params.real("sc_pcb_thickness")?,
            scintillator: params.real("sc_thickness")?,
            reflector: params.real("sc_reflector_thickness")?,
        };
        let cfg = Self {
            name: params.detector().to_string(),
            inner_radius: params.real("inner_radius")?,
            barrel_half_z: params.real("barrel_half_z")?,
            nsides: params.int("nsides")? as u32,
            tower_count: params.int("tower_count")? as u32,
            cell_size: params.real("cell_size")?,
            fiber_thickness: params.real("fiber_thickness")?,
            support_thickness: params.real("support_thickness")?,
            front_face_thickness: params.real("front_face_thickness")?,
            lateral_face_thickness: params.real("lateral_face_thickness")?,
            slab,
            sc_slab,
            stave_material: stave_material.to_string(),
            stave_vis: None,
            tolerance: params.real("tolerance").unwrap_or(0.),
            layer_types,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Semantic validation of the assembled configuration. Replaces the
    /// legacy loop's silent skip with an up-front consistency check.
    pub fn validate(&self) -> Result<(), CaloError> {
        if self.layer_types.is_empty() {
            return Err(CaloError::missing(&self.name, "layer_types", "non-empty list"));
        }
        for (i, spec) in self.layer_types.iter().enumerate() {
            if spec.repeat == 0 {
                return Err(CaloError::not_physical(
                    &self.name,
                    &format!("repeat count of layer type {i}"),
                    0.,
                ));
            }
            if spec.slices.is_empty() {
                return Err(CaloError::not_physical(
                    &self.name,
                    &format!("slice count of layer type {i}"),
                    0.,
                ));
            }
            for slice in &spec.slices {
                if slice.thickness <= 0. {
                    return Err(CaloError::not_physical(
                        &self.name,
                        &format!("slice thickness in layer type {i}"),
                        slice.thickness,
                    ));
                }
            }
            if spec.radiator_thickness <= 0. {
                return Err(CaloError::not_physical(
                    &self.name,
                    &format!("radiator thickness of layer type {i}"),
                    spec.radiator_thickness,
                ));
            }
        }
        for (what, value) in [
            ("inner radius", self.inner_radius),
            ("barrel half length", self.barrel_half_z),
            ("cell size", self.cell_size),
            ("fiber thickness", self.fiber_thickness),
            ("number of sides", self.nsides as f64),
            ("tower count", self.tower_count as f64),
            ("usable tower length", self.tower_half_length()),
            ("alveolus length", self.alveolus_dim_z()),
        ] {
            if value <= 0. {
                return Err(CaloError::not_physical(&self.name, what, value));
            }
        }
        if self.tolerance < 0. {
            return Err(CaloError::not_physical(&self.name, "tolerance", self.tolerance));
        }
        Ok(())
    }

    /// Walks the physical layer expansion: 1-based layer index, the layer
    /// technology, and whether a structural plate follows. Each technology is
    /// expanded `repeat` times; the terminal layer reuses the last technology
    /// and has no plate after it.
    pub fn expanded_layers(&self) -> impl Iterator<Item = (u32, &LayerTypeSpec, bool)> {
        let total = self.sensor_layer_count();
        self.layer_types
            .iter()
            .flat_map(|t| std::iter::repeat(t).take(t.repeat as usize))
            .chain(self.layer_types.last())
            .enumerate()
            .map(move |(i, t)| {
                let index = i as u32 + 1;
                (index, t, index < total)
            })
    }

    /// Number of structural radiator sampling positions.
    pub fn radiator_layer_count(&self) -> u32 {
        self.layer_types.iter().map(|t| t.repeat).sum()
    }

    /// Number of physical sensor layers: one per radiator position plus the
    /// terminal layer with no plate after it.
    pub fn sensor_layer_count(&self) -> u32 {
        self.radiator_layer_count() + 1
    }

    /// Axial module length; the barrel is split into [`MODULE_COUNT`] modules.
    pub fn module_dim_z(&self) -> f64 {
        2. * self.barrel_half_z / MODULE_COUNT as f64
    }

    /// Half-length of one tower slot along the module's long axis.
    pub fn tower_half_length(&self) -> f64 {
        (self.module_dim_z() - 2. * self.lateral_face_thickness) / self.tower_count as f64 / 2.
    }

    /// Free length inside one alveolus, after the wrapping fiber sheets and
    /// shielding on both sides.
    pub fn alveolus_dim_z(&self) -> f64 {
        (self.module_dim_z() - 2. * self.lateral_face_thickness) / self.tower_count as f64
            - 2. * N_FIBERS_ALVEOLUS as f64 * self.fiber_thickness
            - 2. * self.slab.h_fiber
            - 2. * self.slab.shielding
    }

    /// Depth consumed before the first layer: module front face plus the
    /// alveolus wrapping fibers.
    pub fn floor_allowance(&self) -> f64 {
        self.front_face_thickness + N_FIBERS_ALVEOLUS as f64 * self.fiber_thickness
    }

    /// Fiber clearance on each side of a structural plate.
    pub fn structure_clearance(&self) -> f64 {
        self.fiber_thickness * (N_FIBERS_ALVEOLUS + N_FIBERS_W_STRUCTURE) as f64
    }

    /// Half-length of a structural radiator plate along the module's long
    /// axis; plates span the full module minus the lateral faces and their
    /// own wrapping fibers.
    pub fn structure_half_length(&self) -> f64 {
        (self.module_dim_z()
            - 2. * self.lateral_face_thickness
            - 2. * N_FIBERS_W_STRUCTURE as f64 * self.fiber_thickness)
            / 2.
    }

    /// Total silicon readout-slab thickness, half the alveolus air gap
    /// included.
    pub fn total_si_slab_thickness(&self) -> f64 {
        self.slab.shielding
            + self.slab.copper
            + self.slab.pcb
            + self.slab.glue_gap
            + self.slab.sensor
            + self.slab.ground
            + self.slab.air_gap / 2.
    }

    /// Total scintillator readout-slab thickness for the alternative
    /// technology, sharing shielding, copper and air gap with the silicon
    /// layup.
    pub fn total_sc_slab_thickness(&self) -> f64 {
        self.slab.shielding
            + self.slab.copper
            + self.sc_slab.pcb
            + self.sc_slab.scintillator
            + self.sc_slab.reflector * 2.
            + self.slab.air_gap / 2.
    }

    /// The reference silicon-tungsten barrel: 1800 mm inner radius, an
    /// 8-sided barrel with 4 towers per module and radiator sampling
    /// 20 x 2.1 mm + 9 x 4.2 mm + 9 x 4.2 mm.
    pub fn reference() -> Result<Self, CaloError> {
        let slab = SlabLayup {
            shielding: 0.1,
            copper: 0.1,
            pcb: 0.8,
            glue_gap: 0.1,
            sensor: 0.5,
            ground: 0.04,
            air_gap: 0.25,
            h_fiber: 0.5,
        };
        let mut layer_types = vec![
            LayerTypeSpec::alveolus(20, &slab, 2.1, "tungsten"),
            LayerTypeSpec::alveolus(9, &slab, 4.2, "tungsten"),
            LayerTypeSpec::alveolus(9, &slab, 4.2, "tungsten"),
        ];
        for t in &mut layer_types {
            t.vis = Some("ecal_layer_vis".to_string());
        }
        let params = ParameterSet::new("EcalBarrel")
            .set_real("inner_radius", 1800.0)
            .set_real("barrel_half_z", 2350.0)
            .set_int("nsides", 8)
            .set_int("tower_count", 4)
            .set_real("cell_size", 5.1)
            .set_real("fiber_thickness", 0.15)
            .set_real("support_thickness", 2.5)
            .set_real("front_face_thickness", 1.0)
            .set_real("lateral_face_thickness", 10.0)
            .set_real("slab_shielding", slab.shielding)
            .set_real("slab_copper_thickness", slab.copper)
            .set_real("slab_pcb_thickness", slab.pcb)
            .set_real("slab_glue_gap", slab.glue_gap)
            .set_real("si_thickness", slab.sensor)
            .set_real("slab_ground_thickness", slab.ground)
            .set_real("alveolus_air_gap", slab.air_gap)
            .set_real("slab_h_fiber_thickness", slab.h_fiber)
            .set_real("sc_pcb_thickness", 0.8)
            .set_real("sc_thickness", 3.0)
            .set_real("sc_reflector_thickness", 0.1);
        let mut cfg = Self::from_params(&params, "tungsten", layer_types)?;
        cfg.stave_vis = Some("ecal_stave_vis".to_string());
        Ok(cfg)
    }
}

use crate::barrel::config::{BarrelConfig, LayerTypeSpec};
use crate::barrel::envelope::ModuleEnvelope;
use crate::barrel::metadata::{CaloLayerRecord, LayeredCaloData};
use crate::error::CaloError;
use crate::geom::EPS;
use crate::geom::solid::Solid;
use crate::geom::vector::Vector;
use crate::geom::volume::Volume;
use crate::material::{Material, MaterialRegistry, MaterialRole};
use crate::uid::UID;
use std::sync::Arc;
use tracing::debug;

/// A material sheet positioned within its layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedSlice {
    /// Offset of the slice's inner face from the layer center; slices are
    /// contiguous, `offset[i+1] = offset[i] + thickness[i]`.
    pub offset: f64,
    pub thickness: f64,
    pub material: String,
    pub role: MaterialRole,
    pub sensitive: bool,
}

/// One expanded layer of the stack, immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalLayer {
    /// 1-based position counting from the inner face.
    pub index: u32,
    /// Inner face of the layer relative to the module midplane, outward
    /// positive.
    pub axial_position: f64,
    pub thickness: f64,
    pub slices: Vec<PositionedSlice>,
    /// Tower slots this layer is replicated into.
    pub tower_ids: Vec<u32>,
}

/// The absorber plate between successive layers. Common structural material:
/// it spans the full module width and is not replicated per tower.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralLayer {
    /// Plate center relative to the module midplane, outward positive.
    pub axial_position: f64,
    pub thickness: f64,
    pub half_width: f64,
    pub half_length: f64,
}

/// The mutable state of the stack walk, made explicit so each expansion step
/// is a pure `cursor -> cursor` transformation.
///
/// `half_width` shrinks as the trapezoid narrows with radius; `pos` starts at
/// half the module thickness and walks toward the outer face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackCursor {
    pub half_width: f64,
    pub pos: f64,
}

/// Helper-surface record attached to the first layer's sensitive slices, one
/// per tower, for external track extrapolation.
#[derive(Debug, Clone)]
pub struct SensorSurface {
    pub layer: u32,
    pub tower: u32,
    pub volume_uid: UID,
    pub half_thickness: f64,
    pub u: Vector,
    pub v: Vector,
    pub normal: Vector,
}

/// Everything the stack walk produces: the layer sequence, the interleaved
/// plates, the populated module volume and the helper surfaces.
#[derive(Debug, Clone)]
pub struct StackBuild {
    pub layers: Vec<PhysicalLayer>,
    pub structural: Vec<StructuralLayer>,
    pub module: Volume,
    pub surfaces: Vec<SensorSurface>,
}

/// Result of one expansion step.
struct LayerStep {
    cursor: StackCursor,
    layer: PhysicalLayer,
    plate: Option<StructuralLayer>,
    record: Option<CaloLayerRecord>,
}

/// Shared read-only inputs of the walk.
struct Ctx<'a> {
    cfg: &'a BarrelConfig,
    env: &'a ModuleEnvelope,
    tower_half: f64,
    clearance: f64,
    plate_half_length: f64,
}

fn resolve<'a>(
    materials: &'a MaterialRegistry,
    detector: &str,
    name: &str,
) -> Result<&'a Material, CaloError> {
    materials
        .get(name)
        .ok_or_else(|| CaloError::missing(detector, name, "registered material"))
}

/// Expands the configured layer types into the full stack, walking axially
/// outward from the inner face, and populates the module volume.
///
/// Metadata records are appended to `calo` in the same pass, inner to outer.
pub fn build_stack(
    cfg: &BarrelConfig,
    env: &ModuleEnvelope,
    materials: &MaterialRegistry,
    calo: &mut LayeredCaloData,
) -> Result<StackBuild, CaloError> {
    // Every referenced material must resolve before any volume is created.
    resolve(materials, &cfg.name, "air")?;
    resolve(materials, &cfg.name, &cfg.stave_material)?;
    for spec in &cfg.layer_types {
        for slice in &spec.slices {
            resolve(materials, &cfg.name, &slice.material)?;
        }
    }

    debug!("alveolus_dim_z = {}", cfg.alveolus_dim_z());
    debug!("total_si_slab_thickness = {}", cfg.total_si_slab_thickness());
    debug!("total_sc_slab_thickness = {}", cfg.total_sc_slab_thickness());

    let ctx = Ctx {
        cfg,
        env,
        tower_half: cfg.tower_half_length(),
        clearance: cfg.structure_clearance(),
        plate_half_length: cfg.structure_half_length(),
    };

    let mut module = Volume::new(
        &format!("{}_module", cfg.name),
        Solid::Trapezoid {
            top_x: env.top_width / 2.,
            bottom_x: env.bottom_width / 2.,
            dy: env.axial_half_length,
            dz: env.depth_half_thickness,
        },
        "air",
    );
    if let Some(vis) = &cfg.stave_vis {
        module = module.with_vis(vis);
    }

    let mut cursor = StackCursor {
        half_width: env.bottom_width / 2. - cfg.floor_allowance(),
        pos: env.depth_half_thickness - cfg.floor_allowance(),
    };

    let mut layers = Vec::new();
    let mut structural = Vec::new();
    let mut surfaces = Vec::new();

    for (index, spec, has_plate) in cfg.expanded_layers() {
        let step = expand_layer(&ctx, index, spec, has_plate, cursor, &mut module, &mut surfaces)?;
        cursor = step.cursor;
        layers.push(step.layer);
        if let Some(plate) = step.plate {
            structural.push(plate);
        }
        if let Some(record) = step.record {
            calo.push_layer(record);
        }
    }

    Ok(StackBuild {
        layers,
        structural,
        module,
        surfaces,
    })
}

/// Expands one physical layer: consumes width, lays the slice sub-stack,
/// replicates into the tower slots, and inserts the following structural
/// plate while one is still due.
fn expand_layer(
    ctx: &Ctx,
    index: u32,
    spec: &LayerTypeSpec,
    has_plate: bool,
    mut cursor: StackCursor,
    module: &mut Volume,
    surfaces: &mut Vec<SensorSurface>,
) -> Result<LayerStep, CaloError> {
    let cfg = ctx.cfg;
    let tol = cfg.tolerance;
    let thickness = spec.thickness();

    cursor.half_width -= thickness;
    if cursor.half_width <= 0. {
        return Err(CaloError::not_physical(
            &cfg.name,
            &format!("half width of layer {index}"),
            cursor.half_width,
        ));
    }

    let mut layer_vol = Volume::new(
        &format!("{}_layer{}", cfg.name, index),
        Solid::Cuboid {
            dx: cursor.half_width - tol,
            dy: ctx.tower_half - tol,
            dz: thickness / 2. - tol,
        },
        "air",
    );
    if let Some(vis) = &spec.vis {
        layer_vol = layer_vol.with_vis(vis);
    }

    // Slice sub-stack, contiguous in declaration order.
    let mut offset = -thickness / 2.;
    let mut slices = Vec::with_capacity(spec.slices.len());
    let mut detected_radiator: Option<f64> = None;
    for (i, slice) in spec.slices.iter().enumerate() {
        let s_num = i as i32 + 1;
        let mut slice_vol = Volume::new(
            &format!("{}_layer{}_slice{}", cfg.name, index, s_num),
            Solid::Cuboid {
                dx: cursor.half_width - tol,
                dy: ctx.tower_half - tol,
                dz: slice.thickness / 2.,
            },
            &slice.material,
        );
        if slice.sensitive {
            slice_vol = slice_vol.sensitive();
        }
        let slice_vol = Arc::new(slice_vol);

        if index == 1 && slice.sensitive {
            // Track-extrapolation helpers on the innermost sensors, one per
            // tower replica.
            for tower in 0..cfg.tower_count {
                surfaces.push(SensorSurface {
                    layer: index,
                    tower,
                    volume_uid: slice_vol.uid.clone(),
                    half_thickness: slice.thickness / 2.,
                    u: Vector::unit_x(),
                    v: Vector::unit_y(),
                    normal: Vector::unit_z(),
                });
            }
        }

        let ids = if slice.sensitive {
            vec![("slice".to_string(), s_num)]
        } else {
            Vec::new()
        };
        layer_vol.place(
            slice_vol,
            Vector::new(0., 0., offset + slice.thickness / 2.),
            ids,
        );
        slices.push(PositionedSlice {
            offset,
            thickness: slice.thickness,
            material: slice.material.clone(),
            role: slice.role,
            sensitive: slice.sensitive,
        });
        if slice.role == MaterialRole::Absorber {
            detected_radiator = Some(slice.thickness);
        }
        offset += slice.thickness;
    }
    // EPS absorbs the rounding of the running offset; tol is the physical
    // slack.
    if offset - thickness / 2. > tol + EPS {
        return Err(CaloError::not_physical(
            &cfg.name,
            &format!("slice overflow in layer {index}"),
            offset - thickness / 2.,
        ));
    }

    // Same axial position in every tower slot, distinct transverse position
    // along the module's long axis.
    let layer_vol = Arc::new(layer_vol);
    let mut pos_y = cfg.module_dim_z() / 2.;
    let mut tower_ids = Vec::with_capacity(cfg.tower_count as usize);
    for tower in 0..cfg.tower_count {
        pos_y -= ctx.tower_half;
        module.place(
            layer_vol.clone(),
            Vector::new(0., pos_y, cursor.pos - thickness / 2.),
            vec![
                ("layer".to_string(), index as i32),
                ("tower".to_string(), tower as i32),
            ],
        );
        tower_ids.push(tower);
        pos_y -= ctx.tower_half;
    }

    let layer = PhysicalLayer {
        index,
        axial_position: -cursor.pos,
        thickness,
        slices,
        tower_ids,
    };

    // A plate is due: its thickness comes from the layer's absorber-role
    // slice. A missing match means the stave radiator is inconsistent with
    // the slice table and the whole construction aborts.
    let radiator = if has_plate {
        let r = detected_radiator.ok_or_else(|| CaloError::MaterialMismatch {
            detector: cfg.name.clone(),
            layer: index,
        })?;
        if r <= 0. {
            return Err(CaloError::not_physical(
                &cfg.name,
                &format!("radiator thickness in layer {index}"),
                r,
            ));
        }
        Some(r)
    } else {
        None
    };

    let record = radiator.map(|r| CaloLayerRecord {
        distance: cfg.inner_radius + ctx.env.depth_half_thickness + layer.axial_position,
        thickness: thickness + r,
        absorber_thickness: r,
        cell_size0: cfg.cell_size,
        cell_size1: cfg.cell_size,
    });

    cursor.pos -= thickness;

    let plate = if let Some(r) = radiator {
        cursor.half_width -= r + ctx.clearance;
        if cursor.half_width <= 0. {
            return Err(CaloError::not_physical(
                &cfg.name,
                &format!("structure width after layer {index}"),
                cursor.half_width,
            ));
        }
        debug!("layer {index}: radiator_dim_x = {}", 2. * cursor.half_width);

        let plate_center = cursor.pos - ctx.clearance - r / 2.;
        cursor.pos -= ctx.clearance;

        let mut plate_vol = Volume::new(
            &format!("{}_layer{}_absorber", cfg.name, index),
            Solid::Cuboid {
                dx: cursor.half_width,
                dy: ctx.plate_half_length,
                dz: r / 2.,
            },
            &cfg.stave_material,
        );
        if let Some(vis) = &spec.vis {
            plate_vol = plate_vol.with_vis(vis);
        }
        let half_width = cursor.half_width;
        module.place(Arc::new(plate_vol), Vector::new(0., 0., plate_center), Vec::new());

        cursor.half_width -= ctx.clearance;
        cursor.pos -= r + ctx.clearance;

        Some(StructuralLayer {
            axial_position: -plate_center,
            thickness: r,
            half_width,
            half_length: ctx.plate_half_length,
        })
    } else {
        None
    };

    Ok(LayerStep {
        cursor,
        layer,
        plate,
        record,
    })
}

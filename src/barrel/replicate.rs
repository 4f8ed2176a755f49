use crate::barrel::config::{BarrelConfig, MODULE_COUNT};
use crate::barrel::envelope::ModuleEnvelope;
use crate::geom::solid::Solid;
use crate::geom::transform::Transform;
use crate::geom::vector::Vector;
use crate::geom::volume::Volume;
use crate::uid::UID;
use rayon::prelude::*;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::sync::Arc;

/// One rigid placement of the module stack into the barrel, tagged with its
/// identifying indices for later lookup.
#[derive(Debug, Clone)]
pub struct ModulePlacement {
    /// Axial module index, 1-based.
    pub module: u32,
    /// Azimuthal stave index, 1-based.
    pub stave: u32,
    pub transform: Transform,
    pub element_name: String,
    pub element_uid: UID,
}

/// The barrel envelope with all module placements inside it.
#[derive(Debug, Clone)]
pub struct Replication {
    pub envelope: Volume,
    pub placements: Vec<ModulePlacement>,
    /// Element reused by the first placement; every other placement is a
    /// distinct clone sharing the same module volume.
    pub canonical_uid: UID,
}

/// Transform of one (stave, module) slot.
///
/// `rotation_sign` flips the stave angle as a whole: the legacy layout used
/// the right-hand rule, the target convention rotates clockwise (left-hand),
/// so the caller passes an explicit `-1.0`. The radial offset is rotated by
/// the same flipped angle, keeping the module frame covariant with its
/// position.
pub fn slot_transform(
    cfg: &BarrelConfig,
    env: &ModuleEnvelope,
    stave: u32,
    module: u32,
    rotation_sign: f64,
) -> Transform {
    let dphi = 2. * PI / cfg.nsides as f64;
    let hphi = dphi / 2.;
    let phi = rotation_sign * ((stave as f64 - 1.) * dphi - hphi);

    let x = env.module_thickness() * FRAC_PI_4.sin();
    let y = cfg.inner_radius + env.module_thickness() / 2.;
    let z_off = (2. * module as f64 - MODULE_COUNT as f64 - 1.) * env.axial_half_length;

    Transform::rotation(&Vector::unit_z(), phi)
        .compose(&Transform::rotation(&Vector::unit_x(), FRAC_PI_2))
        .with_translation(Vector::new(
            x * phi.cos() - y * phi.sin(),
            x * phi.sin() + y * phi.cos(),
            z_off,
        ))
}

/// Places the module stack at every stave position around the polygon and at
/// every axial module position.
///
/// Each slot is independent (read-only module stack, write-once placement),
/// so the staves fan out in parallel; the collected order stays stave-major
/// and deterministic.
pub fn place_modules(
    cfg: &BarrelConfig,
    env: &ModuleEnvelope,
    module_vol: Arc<Volume>,
) -> Replication {
    let canonical_uid = UID::new();

    // Right-hand -> left-hand convention flip; see `slot_transform`.
    let rotation_sign = -1.0;

    let placements: Vec<ModulePlacement> = (1..=cfg.nsides)
        .into_par_iter()
        .flat_map_iter(|stave| {
            let canonical_uid = canonical_uid.clone();
            (1..=MODULE_COUNT).map(move |module| {
                let element_uid = if stave == 1 && module == 1 {
                    canonical_uid.clone()
                } else {
                    UID::new()
                };
                ModulePlacement {
                    module,
                    stave,
                    transform: slot_transform(cfg, env, stave, module, rotation_sign),
                    element_name: format!("module{module}stave{stave}"),
                    element_uid,
                }
            })
        })
        .collect();

    let half_angle = PI / cfg.nsides as f64;
    let mut envelope = Volume::new(
        &format!("{}_envelope", cfg.name),
        Solid::PolyhedraBarrel {
            nsides: cfg.nsides,
            rmin: cfg.inner_radius,
            rmax: (cfg.inner_radius + env.module_thickness()) / half_angle.cos(),
            dz: cfg.barrel_half_z,
        },
        "air",
    );
    for p in &placements {
        envelope.place_transformed(
            module_vol.clone(),
            p.transform.clone(),
            vec![
                ("module".to_string(), p.module as i32),
                ("stave".to_string(), p.stave as i32),
            ],
        );
    }

    Replication {
        envelope,
        placements,
        canonical_uid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn setup() -> (BarrelConfig, ModuleEnvelope, Replication) {
        let cfg = BarrelConfig::reference().unwrap();
        let env = ModuleEnvelope::derive(&cfg).unwrap();
        let module = Arc::new(Volume::new(
            "module",
            Solid::Cuboid {
                dx: 1.,
                dy: 1.,
                dz: 1.,
            },
            "air",
        ));
        let rep = place_modules(&cfg, &env, module);
        (cfg, env, rep)
    }

    #[test]
    fn test_slot_coverage() {
        let (cfg, _, rep) = setup();
        assert_eq!(
            rep.placements.len(),
            (cfg.nsides * MODULE_COUNT) as usize
        );
        let tags: HashSet<(u32, u32)> =
            rep.placements.iter().map(|p| (p.stave, p.module)).collect();
        assert_eq!(tags.len(), rep.placements.len());
        assert_eq!(rep.envelope.placements().len(), rep.placements.len());
    }

    #[test]
    fn test_stave_major_order() {
        let (_, _, rep) = setup();
        assert_eq!((rep.placements[0].stave, rep.placements[0].module), (1, 1));
        assert_eq!((rep.placements[1].stave, rep.placements[1].module), (1, 2));
        assert_eq!(
            (rep.placements[5].stave, rep.placements[5].module),
            (2, 1)
        );
    }

    #[test]
    fn test_canonical_element_reused_once() {
        let (_, _, rep) = setup();
        assert_eq!(rep.placements[0].element_uid, rep.canonical_uid);
        let clones: HashSet<_> = rep
            .placements
            .iter()
            .map(|p| p.element_uid.clone())
            .collect();
        assert_eq!(clones.len(), rep.placements.len());
        assert_eq!(rep.placements[3].element_name, "module4stave1");
    }

    #[test]
    fn test_axial_offsets_are_symmetric() {
        let (_, env, rep) = setup();
        let offsets: Vec<f64> = rep
            .placements
            .iter()
            .filter(|p| p.stave == 1)
            .map(|p| p.transform.translation_part().dz)
            .collect();
        let d = env.axial_half_length;
        assert_eq!(offsets, vec![-4. * d, -2. * d, 0., 2. * d, 4. * d]);
    }

    #[test]
    fn test_module_local_frame_faces_the_axis() {
        // The tilt plus the flipped rotation must point the module's local +z
        // (its wide face) back at the beam axis, for every stave.
        let (_, _, rep) = setup();
        for p in rep.placements.iter().filter(|p| p.module == 3) {
            let center = p.transform.translation_part();
            let z_local = p.transform.apply(&Vector::unit_z()) - center;
            // No axial component after the tilt.
            assert!(z_local.dz.abs() < 1e-12);
            let radial = Vector::new(center.dx, center.dy, 0.);
            assert!(
                z_local.dot(radial) < 0.,
                "stave {} local +z does not face inward",
                p.stave
            );
        }
    }

    #[test]
    fn test_first_stave_translation() {
        let (cfg, env, rep) = setup();
        // Stave 1 sits at -half-segment, negated by the convention flip.
        let phi = PI / cfg.nsides as f64;
        let x = env.module_thickness() * FRAC_PI_4.sin();
        let y = cfg.inner_radius + env.module_thickness() / 2.;
        let t = rep.placements[0].transform.translation_part();
        assert!((t.dx - (x * phi.cos() - y * phi.sin())).abs() < 1e-12);
        assert!((t.dy - (x * phi.sin() + y * phi.cos())).abs() < 1e-12);
        // The radial distance of every module center is the same.
        let r = (y.powi(2) + x.powi(2)).sqrt();
        for p in &rep.placements {
            let c = p.transform.translation_part();
            let rc = (c.dx.powi(2) + c.dy.powi(2)).sqrt();
            assert!((rc - r).abs() < 1e-9);
        }
    }
}

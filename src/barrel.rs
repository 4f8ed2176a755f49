pub mod config;
pub mod envelope;
pub mod metadata;
pub mod replicate;
pub mod stack;

use crate::error::CaloError;
use crate::geom::volume::Volume;
use crate::material::MaterialRegistry;
use config::BarrelConfig;
use envelope::ModuleEnvelope;
use metadata::LayeredCaloData;
use replicate::{ModulePlacement, Replication, place_modules};
use stack::{PhysicalLayer, SensorSurface, StackBuild, StructuralLayer, build_stack};
use std::sync::Arc;
use tracing::info;

/// The completed barrel: the solid hierarchy, the layer bookkeeping, and the
/// reconstruction summary. Immutable once returned.
#[derive(Debug, Clone)]
pub struct BarrelGeometry {
    pub name: String,
    /// Barrel envelope holding one tagged placement per (module, stave) slot.
    pub envelope: Volume,
    /// The stack volume shared by all slot placements.
    pub module: Arc<Volume>,
    pub module_envelope: ModuleEnvelope,
    pub layers: Vec<PhysicalLayer>,
    pub structural: Vec<StructuralLayer>,
    pub placements: Vec<ModulePlacement>,
    pub surfaces: Vec<SensorSurface>,
    pub calo_data: LayeredCaloData,
}

/// Constructs the barrel from a validated configuration.
///
/// Single pass, fail-fast: either the full geometry comes back, or the first
/// inconsistency aborts with a [`CaloError`] and no partial result.
pub fn build(cfg: &BarrelConfig, materials: &MaterialRegistry) -> Result<BarrelGeometry, CaloError> {
    cfg.validate()?;

    let module_envelope = ModuleEnvelope::derive(cfg)?;
    let mut calo_data = LayeredCaloData::new(cfg, &module_envelope);

    let StackBuild {
        layers,
        structural,
        module,
        surfaces,
    } = build_stack(cfg, &module_envelope, materials, &mut calo_data)?;

    let module = Arc::new(module);
    let Replication {
        envelope,
        placements,
        canonical_uid: _,
    } = place_modules(cfg, &module_envelope, module.clone());

    info!(
        "constructed {}: {} layers, {} structural plates, {} records, {} slot placements",
        cfg.name,
        layers.len(),
        structural.len(),
        calo_data.layers.len(),
        placements.len()
    );

    Ok(BarrelGeometry {
        name: cfg.name.clone(),
        envelope,
        module,
        module_envelope,
        layers,
        structural,
        placements,
        surfaces,
        calo_data,
    })
}

pub mod barrel;
pub mod error;
pub mod geom;
pub mod material;
pub mod params;
mod uid;

// Prelude
pub use barrel::config::{BarrelConfig, LayerTypeSpec, SlabLayup, SliceSpec};
pub use barrel::envelope::ModuleEnvelope;
pub use barrel::metadata::{CaloLayerRecord, LayeredCaloData};
pub use barrel::{BarrelGeometry, build};
pub use error::CaloError;
pub use geom::solid::Solid;
pub use geom::transform::Transform;
pub use geom::vector::Vector;
pub use geom::volume::{Placement, Volume};
pub use material::{Material, MaterialRegistry, MaterialRole};
pub use params::{Param, ParameterSet};
pub use uid::UID;

use anyhow::Result;
use calo3d::{BarrelConfig, MaterialRegistry};

fn main() -> Result<()> {
    let cfg = BarrelConfig::reference()?;
    let materials = MaterialRegistry::with_presets();
    let geo = calo3d::build(&cfg, &materials)?;

    let env = &geo.module_envelope;
    println!("{}", geo.name);
    println!("  module thickness : {:.3} mm", env.module_thickness());
    println!("  bottom width     : {:.3} mm", env.bottom_width);
    println!("  top width        : {:.3} mm", env.top_width);
    println!("  sensor layers    : {}", geo.layers.len());
    println!("  absorber plates  : {}", geo.structural.len());
    println!("  layer records    : {}", geo.calo_data.layers.len());
    println!("  slot placements  : {}", geo.placements.len());
    println!(
        "  radial extent    : {:.1} .. {:.1} mm",
        geo.calo_data.extent.rmin, geo.calo_data.extent.rmax
    );
    Ok(())
}

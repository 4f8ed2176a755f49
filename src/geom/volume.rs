use crate::geom::solid::Solid;
use crate::geom::transform::Transform;
use crate::geom::vector::Vector;
use crate::uid::UID;
use std::sync::Arc;

/// A named solid filled with a material, holding placements of child volumes.
///
/// Child subtrees are shared (`Arc`), so one layer volume can be placed once
/// per tower and one module volume once per stave without duplication. The
/// tree is built bottom-up and is immutable once handed out.
#[derive(Debug, Clone)]
pub struct Volume {
    pub name: String,
    pub uid: UID,
    pub solid: Solid,
    /// Material token name; resolved by the external material collaborator.
    pub material: String,
    /// Marks the volume for external readout-channel assignment.
    pub sensitive: bool,
    /// Visualization-attribute tag, assigned externally.
    pub vis: Option<String>,
    placements: Vec<Placement>,
}

/// One placement of a child volume, tagged with integer identifiers
/// (layer, tower, slice, module, stave) for later external lookup.
#[derive(Debug, Clone)]
pub struct Placement {
    pub volume: Arc<Volume>,
    pub transform: Transform,
    pub ids: Vec<(String, i32)>,
}

impl Volume {
    pub fn new(name: &str, solid: Solid, material: &str) -> Self {
        Self {
            name: name.to_string(),
            uid: UID::new(),
            solid,
            material: material.to_string(),
            sensitive: false,
            vis: None,
            placements: Vec::new(),
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_vis(mut self, vis: &str) -> Self {
        self.vis = Some(vis.to_string());
        self
    }

    /// Places a child at a position, with no rotation.
    pub fn place(&mut self, child: Arc<Volume>, at: Vector, ids: Vec<(String, i32)>) {
        self.place_transformed(child, Transform::translation(at), ids);
    }

    /// Places a child with a full rigid transform.
    pub fn place_transformed(
        &mut self,
        child: Arc<Volume>,
        transform: Transform,
        ids: Vec<(String, i32)>,
    ) {
        self.placements.push(Placement {
            volume: child,
            transform,
            ids,
        });
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Number of volumes in this subtree, counting shared children once per
    /// placement.
    pub fn count_placed(&self) -> usize {
        1 + self
            .placements
            .iter()
            .map(|p| p.volume.count_placed())
            .sum::<usize>()
    }
}

impl Placement {
    /// Returns the tagged value for an identifier name, if present.
    pub fn id(&self, name: &str) -> Option<i32> {
        self.ids
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_and_lookup() {
        let child = Arc::new(Volume::new(
            "slice",
            Solid::Cuboid {
                dx: 1.,
                dy: 1.,
                dz: 0.5,
            },
            "silicon",
        ));
        let mut parent = Volume::new(
            "layer",
            Solid::Cuboid {
                dx: 2.,
                dy: 2.,
                dz: 2.,
            },
            "air",
        );
        parent.place(
            child.clone(),
            Vector::new(0., 0., -1.),
            vec![("slice".to_string(), 1)],
        );
        parent.place(child, Vector::new(0., 0., 1.), vec![("slice".to_string(), 2)]);

        assert_eq!(parent.placements().len(), 2);
        assert_eq!(parent.placements()[0].id("slice"), Some(1));
        assert_eq!(parent.placements()[1].id("slice"), Some(2));
        assert_eq!(parent.placements()[0].id("tower"), None);
        assert_eq!(parent.count_placed(), 3);
    }

    #[test]
    fn test_shared_child_identity() {
        let child = Arc::new(Volume::new(
            "layer",
            Solid::Cuboid {
                dx: 1.,
                dy: 1.,
                dz: 1.,
            },
            "air",
        ));
        let mut parent = Volume::new(
            "module",
            Solid::Cuboid {
                dx: 5.,
                dy: 5.,
                dz: 5.,
            },
            "air",
        );
        for i in 0..4 {
            parent.place(
                child.clone(),
                Vector::new(0., i as f64, 0.),
                vec![("tower".to_string(), i)],
            );
        }
        // All placements share the same child volume.
        let uid = &parent.placements()[0].volume.uid;
        assert!(parent.placements().iter().all(|p| &p.volume.uid == uid));
    }
}

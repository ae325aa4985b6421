//! # Connected-Component Grouping
//!
//! Splits a model into printable parts.
//!
//! Selected primitives mark where the model is cut: a contact between two
//! selected primitives is ignored, every other contact holds. Each group is
//! the connected component around a selected seed, so it may pull in
//! unselected neighbors, but never holds a selected primitive twice.
//!
//! Contacts only ever join a sphere to a cylinder, so every breadth-first
//! layer alternates kind with the layer before it.
//!
//! ## Example
//!
//! ```rust
//! use molprint_core::grouping::group_components;
//! use molprint_core::interaction::{ContactGraph, Interaction};
//! use molprint_core::PrimitiveId;
//!
//! let (atom, bond, other) = (PrimitiveId(0), PrimitiveId(1), PrimitiveId(2));
//! let graph = ContactGraph::new(&[
//!     Interaction::new(atom, bond),
//!     Interaction::new(other, bond),
//! ]);
//!
//! // Selecting the atom and the bond cuts their contact
//! let groups = group_components(&[atom, bond], &graph);
//! assert_eq!(groups, vec![vec![atom], vec![bond, other]]);
//! ```

use crate::error::MolPrintResult;
use crate::interaction::ContactGraph;
use crate::kernel::GeometryKernel;
use crate::primitive::{Material, PrimitiveId};
use crate::session::Session;
use config::constants::palette_color;
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;

/// One printable part in the making.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Members in discovery order; the first is the seed
    pub members: Vec<PrimitiveId>,
    /// Palette position; equal to the group's index
    pub color_index: usize,
    pub material: Material,
}

/// Material for the group at `index`.
pub fn group_material(index: usize) -> Material {
    Material {
        name: format!("mat{}", index),
        color: palette_color(index),
    }
}

/// Partitions the selection into connected components.
///
/// Seeds are taken in selection order; a seed already reached from an
/// earlier seed is skipped. Each selected primitive ends up in exactly one
/// group.
pub fn group_components(selection: &[PrimitiveId], graph: &ContactGraph) -> Vec<Vec<PrimitiveId>> {
    let selected: HashSet<PrimitiveId> = selection.iter().copied().collect();
    let mut assigned: HashSet<PrimitiveId> = HashSet::new();
    let mut groups = Vec::new();

    for &seed in selection {
        if !assigned.insert(seed) {
            continue;
        }

        let mut members = vec![seed];
        let mut frontier = vec![seed];

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &current in &frontier {
                for &neighbor in graph.neighbors(current) {
                    if selected.contains(&current) && selected.contains(&neighbor) {
                        continue;
                    }
                    if assigned.insert(neighbor) {
                        members.push(neighbor);
                        next.push(neighbor);
                    }
                }
            }
            frontier = next;
        }

        groups.push(members);
    }

    groups
}

impl<K: GeometryKernel> Session<K> {
    /// Recomputes the groups from the current selection and recolors them.
    ///
    /// Every member of group `n` gets material `mat{n}`, replacing whatever
    /// it had. Returns the number of groups.
    pub fn update_groups(&mut self) -> MolPrintResult<usize> {
        self.require_interactions("group")?;
        let start = Instant::now();

        let graph = ContactGraph::new(&self.interactions);
        let components = group_components(&self.selection, &graph);

        let mut groups = Vec::with_capacity(components.len());
        for (index, members) in components.into_iter().enumerate() {
            let material = group_material(index);
            for &id in &members {
                if let Some(primitive) = self.registry.get_mut(id) {
                    primitive.set_material(material.clone());
                }
            }
            groups.push(Group {
                members,
                color_index: index,
                material,
            });
        }

        self.groups = groups;
        self.observed_selection = self.selection.clone();

        debug!(
            groups = self.groups.len(),
            selected = self.selection.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Updated groups"
        );
        Ok(self.groups.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Interaction;

    fn id(n: u32) -> PrimitiveId {
        PrimitiveId(n)
    }

    /// s0 - c1 - s2 - c3 - s4, a straight chain.
    fn chain() -> ContactGraph {
        ContactGraph::new(&[
            Interaction::new(id(0), id(1)),
            Interaction::new(id(2), id(1)),
            Interaction::new(id(2), id(3)),
            Interaction::new(id(4), id(3)),
        ])
    }

    fn sorted(mut members: Vec<PrimitiveId>) -> Vec<PrimitiveId> {
        members.sort();
        members
    }

    #[test]
    fn test_single_seed_takes_whole_component() {
        let groups = group_components(&[id(0)], &chain());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], vec![id(0), id(1), id(2), id(3), id(4)]);
    }

    #[test]
    fn test_selected_contact_splits_chain() {
        // Selecting the middle atom and its right bond cuts between them
        let groups = group_components(&[id(2), id(3)], &chain());
        assert_eq!(groups.len(), 2);
        assert_eq!(sorted(groups[0].clone()), vec![id(0), id(1), id(2)]);
        assert_eq!(sorted(groups[1].clone()), vec![id(3), id(4)]);
    }

    #[test]
    fn test_everything_selected_gives_singletons() {
        let selection: Vec<_> = (0..5).map(id).collect();
        let groups = group_components(&selection, &chain());
        assert_eq!(groups, selection.iter().map(|&s| vec![s]).collect::<Vec<_>>());
    }

    #[test]
    fn test_seed_reached_earlier_is_skipped() {
        // s0 and s4 are connected through unselected primitives
        let groups = group_components(&[id(0), id(4)], &chain());
        assert_eq!(groups.len(), 1);
        assert!(groups[0].contains(&id(4)));
    }

    #[test]
    fn test_isolated_primitive_is_singleton() {
        let groups = group_components(&[id(9)], &chain());
        assert_eq!(groups, vec![vec![id(9)]]);
    }

    #[test]
    fn test_layers_alternate_kind() {
        // Spheres are even ids, cylinders odd
        let groups = group_components(&[id(0)], &chain());
        for pair in groups[0].windows(2) {
            assert_ne!(pair[0].0 % 2, pair[1].0 % 2);
        }
    }

    #[test]
    fn test_group_materials_follow_palette() {
        let material = group_material(1);
        assert_eq!(material.name, "mat1");
        assert_eq!(material.color, [0.25, 0.66, 0.33]);
    }
}

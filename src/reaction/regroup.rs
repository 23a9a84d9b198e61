use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use crate::graph_ops::{build_component, Decomposition};
use crate::mol::Mol;

use super::error::{IndexSpace, ReactionSmilesError};
use super::group::Group;
use super::highlight::{GraphHighlighting, HighlightFlags};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ComponentSlot {
    atoms: Vec<NodeIndex>,
    forward: usize,
}

/// Connected components of one group molecule, each forwarding to the
/// component it will be merged into.
///
/// Every slot starts out forwarding to itself. A slot that still does is a
/// lead and becomes one final molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentArena {
    group: Group,
    slots: Vec<ComponentSlot>,
}

impl ComponentArena {
    pub fn new(group: Group, decomposition: Decomposition) -> Self {
        let slots = decomposition
            .into_components()
            .into_iter()
            .enumerate()
            .map(|(forward, atoms)| ComponentSlot { atoms, forward })
            .collect();
        Self { group, slots }
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Parent atoms of component `component`, ascending.
    pub fn atoms(&self, component: usize) -> &[NodeIndex] {
        &self.slots[component].atoms
    }

    /// Where `component` currently forwards to.
    pub fn target(&self, component: usize) -> usize {
        self.slots[component].forward
    }

    /// Makes `leaf` part of the final molecule led by `lead`.
    ///
    /// Forwarding is one level deep: `lead` must not itself be forwarded and
    /// `leaf` must not already lead other components. Merging a component
    /// into itself does nothing.
    pub fn forward(&mut self, leaf: usize, lead: usize) -> Result<(), ReactionSmilesError> {
        for idx in [leaf, lead] {
            if idx >= self.slots.len() {
                return Err(ReactionSmilesError::out_of_range(
                    IndexSpace::Component,
                    idx,
                    self.slots.len(),
                ));
            }
        }
        if leaf == lead {
            return Ok(());
        }
        let chained = self.slots[lead].forward != lead
            || self
                .slots
                .iter()
                .enumerate()
                .any(|(idx, slot)| idx != leaf && slot.forward == leaf);
        if chained {
            return Err(ReactionSmilesError::ChainedMerge {
                group: self.group,
                lead,
                leaf,
            });
        }
        self.slots[leaf].forward = lead;
        Ok(())
    }

    /// Components that still forward to themselves, ascending.
    pub fn leads(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(idx, slot)| slot.forward == *idx)
            .map(|(idx, _)| idx)
    }

    /// Components forwarding to `lead` (the lead included), ascending.
    pub fn members(&self, lead: usize) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(move |(_, slot)| slot.forward == lead)
            .map(|(idx, _)| idx)
    }
}

/// A group molecule after directive processing, with where its atoms and
/// bonds start in the reaction-wide index spaces.
#[derive(Debug, Clone, Copy)]
pub struct GroupSource<'a, A, B> {
    pub mol: &'a Mol<A, B>,
    pub aam: &'a [u32],
    pub atom_offset: usize,
    pub bond_offset: usize,
}

/// One molecule ready to go into the reaction.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalMolecule<A, B> {
    pub mol: Mol<A, B>,
    pub aam: Vec<u32>,
    /// Present iff highlight flags were passed to [`regroup`].
    pub highlight: Option<GraphHighlighting>,
}

/// Builds the final molecules of one group: one per lead, each the union
/// of the components forwarding to it.
///
/// Mapping values are copied per atom from the group molecule. When
/// `highlights` is given, the global flags of every carried atom and bond
/// are translated to the new molecule's own indices.
pub fn regroup<A: Clone, B: Clone>(
    source: &GroupSource<'_, A, B>,
    arena: &ComponentArena,
    highlights: Option<&HighlightFlags>,
) -> Result<Vec<FinalMolecule<A, B>>, ReactionSmilesError> {
    let group = arena.group();
    let mut out = Vec::new();

    for lead in arena.leads() {
        let mut mol = Mol::new();
        let mut aam = Vec::new();
        let mut highlight = highlights.map(|_| GraphHighlighting::default());

        for member in arena.members(lead) {
            let component = build_component(source.mol, arena.atoms(member));

            // component bond k -> group molecule bond
            let mut parent_bonds = Vec::with_capacity(component.mol.bond_count());
            for edge in component.mol.graph().edge_references() {
                let (begin, end) = (
                    component.mapping[edge.source().index()],
                    component.mapping[edge.target().index()],
                );
                let parent = source.mol.bond_between(begin, end).ok_or(
                    ReactionSmilesError::InternalEdgeLookupFailure {
                        group,
                        begin: begin.index(),
                        end: end.index(),
                    },
                )?;
                parent_bonds.push(parent);
            }

            aam.extend(
                component
                    .mapping
                    .iter()
                    .map(|atom| source.aam.get(atom.index()).copied().unwrap_or(0)),
            );

            let bond_base = mol.bond_count();
            let new_atoms = mol.merge(component.mol);

            if let (Some(view), Some(flags)) = (highlight.as_mut(), highlights) {
                for (k, parent) in component.mapping.iter().enumerate() {
                    if flags.atom(source.atom_offset + parent.index()) {
                        view.highlight_atom(new_atoms[k]);
                    }
                }
                for (k, parent) in parent_bonds.iter().enumerate() {
                    if flags.bond(source.bond_offset + parent.index()) {
                        view.highlight_bond(EdgeIndex::new(bond_base + k));
                    }
                }
            }
        }

        if let Some(view) = highlight.as_mut() {
            view.fit(mol.atom_count(), mol.bond_count());
        }
        out.push(FinalMolecule {
            mol,
            aam,
            highlight,
        });
    }

    debug!(
        %group,
        components = arena.len(),
        molecules = out.len(),
        "regrouped components"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::{Bond, BondOrder};
    use crate::graph_ops::decompose;
    use crate::smiles::{parse_smiles_with, SmilesOptions};

    fn parsed(smiles: &str) -> (Mol<Atom, Bond>, Vec<u32>) {
        let options = SmilesOptions {
            in_reaction: true,
            ..SmilesOptions::default()
        };
        let p = parse_smiles_with(smiles, &options).unwrap();
        (p.mol, p.atom_map)
    }

    fn arena(mol: &Mol<Atom, Bond>) -> ComponentArena {
        ComponentArena::new(Group::Reactant, decompose(mol))
    }

    fn source<'a>(mol: &'a Mol<Atom, Bond>, aam: &'a [u32]) -> GroupSource<'a, Atom, Bond> {
        GroupSource {
            mol,
            aam,
            atom_offset: 0,
            bond_offset: 0,
        }
    }

    #[test]
    fn identity_forwarding_keeps_components_apart() {
        let (mol, aam) = parsed("CC.O.N");
        let arena = arena(&mol);
        assert_eq!(arena.leads().collect::<Vec<_>>(), vec![0, 1, 2]);
        let out = regroup(&source(&mol, &aam), &arena, None).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].mol.atom_count(), 2);
        assert_eq!(out[0].mol.bond_count(), 1);
        assert!(out[2].highlight.is_none());
    }

    #[test]
    fn merge_unions_forwarded_components() {
        let (mol, aam) = parsed("[Na+:1].[Cl-:2].O");
        let mut arena = arena(&mol);
        arena.forward(1, 0).unwrap();
        let out = regroup(&source(&mol, &aam), &arena, None).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].mol.atom_count(), 2);
        assert_eq!(out[0].aam, vec![1, 2]);
        assert_eq!(out[1].aam, vec![0]);
    }

    #[test]
    fn leaf_before_lead_is_still_merged() {
        let (mol, aam) = parsed("[C:1].[O:2].[N:3]");
        let mut arena = arena(&mol);
        arena.forward(0, 2).unwrap();
        let out = regroup(&source(&mol, &aam), &arena, None).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].aam, vec![2]);
        assert_eq!(out[1].aam, vec![1, 3]);
    }

    #[test]
    fn chained_merges_are_rejected() {
        let (mol, _) = parsed("C.C.C");
        let mut arena = arena(&mol);
        arena.forward(1, 0).unwrap();
        // lead 1 is itself forwarded
        assert!(matches!(
            arena.forward(2, 1),
            Err(ReactionSmilesError::ChainedMerge { lead: 1, leaf: 2, .. })
        ));
        // leaf 0 already leads 1
        assert!(matches!(
            arena.forward(0, 2),
            Err(ReactionSmilesError::ChainedMerge { lead: 2, leaf: 0, .. })
        ));
        arena.forward(1, 1).unwrap();
        assert_eq!(arena.target(1), 0);
    }

    #[test]
    fn forward_checks_bounds() {
        let (mol, _) = parsed("C.C");
        let mut arena = arena(&mol);
        assert_eq!(
            arena.forward(2, 0).unwrap_err(),
            ReactionSmilesError::OutOfRange {
                space: IndexSpace::Component,
                index: 2,
                bound: 2
            }
        );
    }

    #[test]
    fn highlights_follow_atoms_into_merged_molecule() {
        let (mol, aam) = parsed("CO.N.C=C");
        let mut arena = arena(&mol);
        arena.forward(2, 0).unwrap();
        // the group starts at atom 2 and bond 1 of the reaction
        let mut flags = HighlightFlags::new(8, 4);
        flags.mark_atom(2 + 4).unwrap();
        flags.mark_bond(1 + 1).unwrap();
        flags.mark_atom(2 + 2).unwrap();
        let src = GroupSource {
            mol: &mol,
            aam: &aam,
            atom_offset: 2,
            bond_offset: 1,
        };
        let out = regroup(&src, &arena, Some(&flags)).unwrap();
        assert_eq!(out.len(), 2);
        let merged = out[0].highlight.as_ref().unwrap();
        assert_eq!(out[0].mol.atom_count(), 4);
        assert_eq!(
            merged.highlighted_atoms().collect::<Vec<_>>(),
            vec![NodeIndex::new(3)]
        );
        assert_eq!(
            merged.highlighted_bonds().collect::<Vec<_>>(),
            vec![EdgeIndex::new(1)]
        );
        let lone = out[1].highlight.as_ref().unwrap();
        assert_eq!(
            lone.highlighted_atoms().collect::<Vec<_>>(),
            vec![NodeIndex::new(0)]
        );
    }

    #[test]
    fn bond_highlights_stay_aligned_after_merge() {
        // double bonds are parent bonds 0, 2 and 4
        let (mol, aam) = parsed("C=CC.O=CC=O");
        let mut arena = arena(&mol);
        arena.forward(1, 0).unwrap();
        let mut flags = HighlightFlags::new(mol.atom_count(), mol.bond_count());
        for bond in [0, 2, 4] {
            flags.mark_bond(bond).unwrap();
        }
        let out = regroup(&source(&mol, &aam), &arena, Some(&flags)).unwrap();
        assert_eq!(out.len(), 1);
        let merged = &out[0].mol;
        let highlighted: Vec<_> = out[0]
            .highlight
            .as_ref()
            .unwrap()
            .highlighted_bonds()
            .collect();
        assert_eq!(highlighted.len(), 3);
        for bond in merged.bonds() {
            let is_double = merged.bond(bond).order == BondOrder::Double;
            assert_eq!(highlighted.contains(&bond), is_double, "{bond:?}");
        }
    }

    #[test]
    fn counts_are_conserved() {
        let (mol, aam) = parsed("C1CC1.O=O.[Na+].[Cl-]");
        let mut arena = arena(&mol);
        arena.forward(3, 2).unwrap();
        arena.forward(1, 0).unwrap();
        let out = regroup(&source(&mol, &aam), &arena, None).unwrap();
        let atoms: usize = out.iter().map(|m| m.mol.atom_count()).sum();
        let bonds: usize = out.iter().map(|m| m.mol.bond_count()).sum();
        assert_eq!(atoms, mol.atom_count());
        assert_eq!(bonds, mol.bond_count());
    }
}

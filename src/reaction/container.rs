use crate::mol::Mol;

use super::group::Group;

/// Stable address of one molecule inside a [`Reaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoleculeHandle {
    pub group: Group,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry<A, B> {
    mol: Mol<A, B>,
    aam: Vec<u32>,
}

/// Reactant, agent and product molecules, each with its atom-to-atom
/// mapping array.
///
/// `aam(h)[k]` is the mapping number of atom `k` of molecule `h`, `0` when
/// unmapped. A freshly added molecule has an all-zero mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction<A, B> {
    groups: [Vec<Entry<A, B>>; 3],
}

impl<A, B> Default for Reaction<A, B> {
    fn default() -> Self {
        Self {
            groups: [Vec::new(), Vec::new(), Vec::new()],
        }
    }
}

impl<A, B> Reaction<A, B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, group: Group, mol: Mol<A, B>) -> MoleculeHandle {
        let bucket = &mut self.groups[group.index()];
        let aam = vec![0; mol.atom_count()];
        bucket.push(Entry { mol, aam });
        MoleculeHandle {
            group,
            index: bucket.len() - 1,
        }
    }

    pub fn add_reactant(&mut self, mol: Mol<A, B>) -> MoleculeHandle {
        self.add(Group::Reactant, mol)
    }

    pub fn add_agent(&mut self, mol: Mol<A, B>) -> MoleculeHandle {
        self.add(Group::Agent, mol)
    }

    pub fn add_product(&mut self, mol: Mol<A, B>) -> MoleculeHandle {
        self.add(Group::Product, mol)
    }

    pub fn molecule(&self, handle: MoleculeHandle) -> &Mol<A, B> {
        &self.groups[handle.group.index()][handle.index].mol
    }

    pub fn aam(&self, handle: MoleculeHandle) -> &[u32] {
        &self.groups[handle.group.index()][handle.index].aam
    }

    pub fn aam_mut(&mut self, handle: MoleculeHandle) -> &mut Vec<u32> {
        &mut self.groups[handle.group.index()][handle.index].aam
    }

    pub fn molecules(&self, group: Group) -> impl Iterator<Item = &Mol<A, B>> + '_ {
        self.groups[group.index()].iter().map(|e| &e.mol)
    }

    pub fn reactants(&self) -> impl Iterator<Item = &Mol<A, B>> + '_ {
        self.molecules(Group::Reactant)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Mol<A, B>> + '_ {
        self.molecules(Group::Agent)
    }

    pub fn products(&self) -> impl Iterator<Item = &Mol<A, B>> + '_ {
        self.molecules(Group::Product)
    }

    pub fn count(&self, group: Group) -> usize {
        self.groups[group.index()].len()
    }

    /// Every molecule, in group order then insertion order.
    pub fn handles(&self) -> impl Iterator<Item = MoleculeHandle> + '_ {
        Group::ALL.into_iter().flat_map(move |group| {
            (0..self.count(group)).map(move |index| MoleculeHandle { group, index })
        })
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

use std::collections::BTreeMap;

use bitvec::vec::BitVec;
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::container::{MoleculeHandle, Reaction};
use super::error::{IndexSpace, ReactionSmilesError};

/// Highlighted atoms and bonds of one molecule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphHighlighting {
    atoms: BitVec,
    bonds: BitVec,
}

impl GraphHighlighting {
    pub fn new(atom_count: usize, bond_count: usize) -> Self {
        Self {
            atoms: BitVec::repeat(false, atom_count),
            bonds: BitVec::repeat(false, bond_count),
        }
    }

    pub fn highlight_atom(&mut self, atom: NodeIndex) {
        grow(&mut self.atoms, atom.index() + 1);
        self.atoms.set(atom.index(), true);
    }

    pub fn highlight_bond(&mut self, bond: EdgeIndex) {
        grow(&mut self.bonds, bond.index() + 1);
        self.bonds.set(bond.index(), true);
    }

    pub fn is_atom_highlighted(&self, atom: NodeIndex) -> bool {
        is_set(&self.atoms, atom.index())
    }

    pub fn is_bond_highlighted(&self, bond: EdgeIndex) -> bool {
        is_set(&self.bonds, bond.index())
    }

    pub fn highlighted_atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.atoms.iter_ones().map(NodeIndex::new)
    }

    pub fn highlighted_bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.bonds.iter_ones().map(EdgeIndex::new)
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.not_any() && self.bonds.not_any()
    }

    /// Grows both sets to cover a molecule of the given size.
    pub(crate) fn fit(&mut self, atom_count: usize, bond_count: usize) {
        grow(&mut self.atoms, atom_count);
        grow(&mut self.bonds, bond_count);
    }
}

/// Per-molecule highlight views over a whole reaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReactionHighlighting {
    views: BTreeMap<MoleculeHandle, GraphHighlighting>,
}

impl ReactionHighlighting {
    /// An empty view for every molecule of `reaction`.
    pub fn init<A, B>(reaction: &Reaction<A, B>) -> Self {
        let views = reaction
            .handles()
            .map(|h| {
                let mol = reaction.molecule(h);
                (h, GraphHighlighting::new(mol.atom_count(), mol.bond_count()))
            })
            .collect();
        Self { views }
    }

    pub fn view(&self, handle: MoleculeHandle) -> Option<&GraphHighlighting> {
        self.views.get(&handle)
    }

    pub fn view_mut(&mut self, handle: MoleculeHandle) -> Option<&mut GraphHighlighting> {
        self.views.get_mut(&handle)
    }

    pub fn set_view(&mut self, handle: MoleculeHandle, view: GraphHighlighting) {
        self.views.insert(handle, view);
    }

    /// True if no molecule has anything highlighted.
    pub fn is_empty(&self) -> bool {
        self.views.values().all(GraphHighlighting::is_empty)
    }
}

/// Highlight flags collected by `ha`/`hb` directives, indexed by global
/// atom and bond index across all three groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightFlags {
    atoms: BitVec,
    bonds: BitVec,
}

impl HighlightFlags {
    pub fn new(total_atoms: usize, total_bonds: usize) -> Self {
        Self {
            atoms: BitVec::repeat(false, total_atoms),
            bonds: BitVec::repeat(false, total_bonds),
        }
    }

    pub fn mark_atom(&mut self, index: usize) -> Result<(), ReactionSmilesError> {
        mark(&mut self.atoms, IndexSpace::Atom, index)
    }

    pub fn mark_bond(&mut self, index: usize) -> Result<(), ReactionSmilesError> {
        mark(&mut self.bonds, IndexSpace::Bond, index)
    }

    pub fn atom(&self, index: usize) -> bool {
        is_set(&self.atoms, index)
    }

    pub fn bond(&self, index: usize) -> bool {
        is_set(&self.bonds, index)
    }
}

fn mark(set: &mut BitVec, space: IndexSpace, index: usize) -> Result<(), ReactionSmilesError> {
    if index >= set.len() {
        return Err(ReactionSmilesError::out_of_range(space, index, set.len()));
    }
    set.set(index, true);
    Ok(())
}

fn is_set(set: &BitVec, index: usize) -> bool {
    set.get(index).is_some_and(|bit| *bit)
}

/// Never shrinks.
fn grow(set: &mut BitVec, len: usize) {
    if set.len() < len {
        set.resize(len, false);
    }
}

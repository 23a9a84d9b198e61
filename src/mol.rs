use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::stereo::Stereocenters;

/// Molecular graph generic over atom and bond payloads.
///
/// `Mol<Atom, Bond>` is a parsed molecule; `Mol<AtomExpr, BondExpr>` is a
/// query molecule. Atom and bond indices are dense and stable as long as
/// nothing is removed, which this crate never does.
pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    stereocenters: Stereocenters,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            stereocenters: Stereocenters::new(),
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        self.graph.add_node(atom)
    }

    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edges(idx).map(|e| e.id())
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn stereocenters(&self) -> &Stereocenters {
        &self.stereocenters
    }

    pub fn stereocenters_mut(&mut self) -> &mut Stereocenters {
        &mut self.stereocenters
    }

    /// Appends `other` as a disjoint subgraph.
    ///
    /// Atoms and bonds of `other` keep their relative order and land after
    /// the existing ones. Returns the new index of every atom of `other`,
    /// indexed by its old index.
    pub fn merge(&mut self, other: Mol<A, B>) -> Vec<NodeIndex> {
        let Mol {
            graph,
            stereocenters,
        } = other;
        let (nodes, edges) = graph.into_nodes_edges();

        let mapping: Vec<NodeIndex> = nodes
            .into_iter()
            .map(|node| self.graph.add_node(node.weight))
            .collect();
        for edge in edges {
            let (a, b) = (edge.source(), edge.target());
            self.graph
                .add_edge(mapping[a.index()], mapping[b.index()], edge.weight);
        }

        self.stereocenters
            .extend(stereocenters.remap(|atom| mapping.get(atom.index()).copied()));
        mapping
    }
}

impl<A: Clone, B: Clone> Mol<A, B> {
    /// Copies the subgraph induced by `atoms`.
    ///
    /// Atom `k` of the result is `atoms[k]`; bonds keep their relative
    /// order from `self`. Stereocenters on kept atoms are carried over.
    pub fn induced_subgraph(&self, atoms: &[NodeIndex]) -> Mol<A, B> {
        let mut sub = Mol::new();
        let mut index_map: Vec<Option<NodeIndex>> = vec![None; self.atom_count()];
        for &old in atoms {
            index_map[old.index()] = Some(sub.add_atom(self.atom(old).clone()));
        }
        for edge in self.bonds() {
            let Some((a, b)) = self.bond_endpoints(edge) else {
                continue;
            };
            if let (Some(na), Some(nb)) = (index_map[a.index()], index_map[b.index()]) {
                sub.add_bond(na, nb, self.bond(edge).clone());
            }
        }
        sub.stereocenters = self
            .stereocenters
            .remap(|atom| index_map.get(atom.index()).copied().flatten());
        sub
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            stereocenters: self.stereocenters.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        if self.atoms().any(|idx| self.atom(idx) != other.atom(idx)) {
            return false;
        }
        for idx in self.bonds() {
            if self.bond(idx) != other.bond(idx)
                || self.bond_endpoints(idx) != other.bond_endpoints(idx)
            {
                return false;
            }
        }
        self.stereocenters == other.stereocenters
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("stereocenters", &self.stereocenters)
            .finish()
    }
}

/// Output of a molecule parser: the graph plus one atom-map value per atom.
///
/// `atom_map[k]` is the reaction atom-to-atom mapping number written on
/// atom `k`, or `0` when unmapped.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMolecule<A, B> {
    pub mol: Mol<A, B>,
    pub atom_map: Vec<u32>,
}

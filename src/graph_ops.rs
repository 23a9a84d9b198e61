use petgraph::graph::NodeIndex;

use crate::mol::Mol;

/// Connected components, each sorted ascending, ordered by their smallest atom.
pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for node in mol.atoms() {
        if visited[node.index()] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            component.push(current);
            for neighbor in mol.neighbors(current) {
                if !visited[neighbor.index()] {
                    stack.push(neighbor);
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}

pub fn num_components<A, B>(mol: &Mol<A, B>) -> usize {
    connected_components(mol).len()
}

/// A molecule split into its connected components.
///
/// Only atom sets are stored; component subgraphs are materialized on
/// demand with [`Decomposition::build_component`], so the parent molecule
/// may be edited in between as long as no atoms or bonds are added or
/// removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    components: Vec<Vec<NodeIndex>>,
}

/// One component subgraph plus the parent atom of each of its atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Component<A, B> {
    pub mol: Mol<A, B>,
    /// `mapping[k]` is the parent atom of component atom `k`.
    pub mapping: Vec<NodeIndex>,
}

pub fn decompose<A, B>(mol: &Mol<A, B>) -> Decomposition {
    Decomposition {
        components: connected_components(mol),
    }
}

impl Decomposition {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn into_components(self) -> Vec<Vec<NodeIndex>> {
        self.components
    }

    pub fn build_component<A: Clone, B: Clone>(
        &self,
        component: usize,
        parent: &Mol<A, B>,
    ) -> Component<A, B> {
        build_component(parent, &self.components[component])
    }
}

/// Copies the subgraph of `parent` induced by `atoms`.
pub fn build_component<A: Clone, B: Clone>(
    parent: &Mol<A, B>,
    atoms: &[NodeIndex],
) -> Component<A, B> {
    Component {
        mol: parent.induced_subgraph(atoms),
        mapping: atoms.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::Bond;
    use crate::smiles::parse_smiles;
    use crate::stereo::StereocenterKind;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn mol(smiles: &str) -> Mol<Atom, Bond> {
        parse_smiles(smiles)
            .unwrap_or_else(|e| panic!("bad SMILES {smiles:?}: {e}"))
            .mol
    }

    #[test]
    fn components_ordered_by_first_atom() {
        let m = mol("CC.O.N(C)C");
        let comps = connected_components(&m);
        assert_eq!(comps.len(), 3);
        assert_eq!(comps[0], vec![n(0), n(1)]);
        assert_eq!(comps[1], vec![n(2)]);
        assert_eq!(comps[2], vec![n(3), n(4), n(5)]);
    }

    #[test]
    fn ring_closure_joins_interleaved_atoms() {
        // a ring bond may cross a dot
        let m = mol("C1.C1");
        assert_eq!(num_components(&m), 1);
    }

    #[test]
    fn empty_molecule_has_no_components() {
        let m = Mol::<Atom, Bond>::new();
        assert!(decompose(&m).is_empty());
    }

    #[test]
    fn build_component_maps_back_to_parent() {
        let m = mol("O.CCN");
        let d = decompose(&m);
        assert_eq!(d.len(), 2);
        let comp = d.build_component(1, &m);
        assert_eq!(comp.mol.atom_count(), 3);
        assert_eq!(comp.mol.bond_count(), 2);
        assert_eq!(comp.mapping, vec![n(1), n(2), n(3)]);
        assert_eq!(comp.mol.atom(n(2)).atomic_num, 7);
    }

    #[test]
    fn build_component_carries_stereocenters() {
        let m = mol("O.F[C@H](Cl)Br");
        let d = decompose(&m);
        let comp = d.build_component(1, &m);
        let center = comp.mol.stereocenters().get(n(1)).unwrap();
        assert_eq!(center.kind, StereocenterKind::Absolute);
    }
}

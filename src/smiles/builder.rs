use petgraph::graph::NodeIndex;

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondDirection, BondOrder};
use crate::mol::Mol;
use crate::smiles::parse_tree::{ParseAtom, ParseTree};
use crate::smiles::tokenizer::{BondToken, ChiralityToken};
use crate::stereo::StereocenterKind;

pub fn build_mol(tree: &ParseTree) -> Mol<Atom, Bond> {
    let mut mol = Mol::new();
    let mut node_indices: Vec<NodeIndex> = Vec::with_capacity(tree.atoms.len());

    for parse_atom in &tree.atoms {
        let atom = Atom {
            atomic_num: parse_atom.element.map_or(0, |e| e.atomic_num()),
            formal_charge: parse_atom.charge,
            isotope: parse_atom.isotope,
            is_aromatic: parse_atom.is_aromatic,
            chirality: match parse_atom.chirality {
                ChiralityToken::None => Chirality::None,
                ChiralityToken::CounterClockwise => Chirality::Ccw,
                ChiralityToken::Clockwise => Chirality::Cw,
            },
            ..Atom::default()
        };
        node_indices.push(mol.add_atom(atom));
    }

    let mut added_edges: Vec<Vec<usize>> = vec![Vec::new(); tree.atoms.len()];

    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        for neighbor in &parse_atom.neighbors {
            let j = neighbor.atom_idx;
            if added_edges[i].contains(&j) {
                continue;
            }
            let bond = resolve_bond(
                neighbor.bond,
                parse_atom.is_aromatic,
                tree.atoms[j].is_aromatic,
            );
            mol.add_bond(node_indices[i], node_indices[j], bond);
            added_edges[i].push(j);
            added_edges[j].push(i);
        }
    }

    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        if parse_atom.chirality != ChiralityToken::None {
            mol.stereocenters_mut()
                .add(node_indices[i], StereocenterKind::Absolute, 0);
        }
    }

    resolve_hydrogen_counts(&mut mol, tree, &node_indices);

    mol
}

fn resolve_bond(bond_tok: Option<BondToken>, from_aromatic: bool, to_aromatic: bool) -> Bond {
    let (order, direction) = match bond_tok {
        Some(BondToken::Single) => (BondOrder::Single, BondDirection::None),
        Some(BondToken::Double) => (BondOrder::Double, BondDirection::None),
        Some(BondToken::Triple) => (BondOrder::Triple, BondDirection::None),
        Some(BondToken::Aromatic) => (BondOrder::Aromatic, BondDirection::None),
        Some(BondToken::Up) => (BondOrder::Single, BondDirection::Up),
        Some(BondToken::Down) => (BondOrder::Single, BondDirection::Down),
        None if from_aromatic && to_aromatic => (BondOrder::Aromatic, BondDirection::None),
        None => (BondOrder::Single, BondDirection::None),
    };
    Bond { order, direction }
}

fn resolve_hydrogen_counts(mol: &mut Mol<Atom, Bond>, tree: &ParseTree, indices: &[NodeIndex]) {
    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        let h_count = if parse_atom.is_bracket {
            parse_atom.hcount.unwrap_or(0)
        } else {
            compute_implicit_h(mol, indices[i], parse_atom)
        };
        mol.atom_mut(indices[i]).hydrogen_count = h_count;
    }
}

/// Lowest default valence that fits the bonds, minus the bond order sum.
fn compute_implicit_h(mol: &Mol<Atom, Bond>, node: NodeIndex, parse_atom: &ParseAtom) -> u8 {
    let Some(element) = parse_atom.element else {
        return 0;
    };
    let bond_order_sum = bond_order_sum(mol, node);
    let Some(target) = element
        .default_valences()
        .iter()
        .copied()
        .find(|&v| v >= bond_order_sum)
    else {
        return 0;
    };

    let h = target - bond_order_sum;
    if parse_atom.is_aromatic {
        h.saturating_sub(1)
    } else {
        h
    }
}

fn bond_order_sum(mol: &Mol<Atom, Bond>, node: NodeIndex) -> u8 {
    mol.bonds_of(node)
        .map(|edge| match mol.bond(edge).order {
            BondOrder::Single | BondOrder::Aromatic => 1u8,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        })
        .fold(0u8, u8::saturating_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_tree::build_parse_tree;
    use crate::smiles::tokenizer::tokenize;

    fn parse(s: &str) -> Mol<Atom, Bond> {
        let tokens = tokenize(s).unwrap();
        let tree = build_parse_tree(&tokens, false).unwrap();
        build_mol(&tree)
    }

    fn h(mol: &Mol<Atom, Bond>, i: usize) -> u8 {
        mol.atom(NodeIndex::new(i)).hydrogen_count
    }

    #[test]
    fn methane_h_count() {
        let mol = parse("C");
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(h(&mol, 0), 4);
    }

    #[test]
    fn ethene_h_counts() {
        let mol = parse("C=C");
        assert_eq!(h(&mol, 0), 2);
        assert_eq!(h(&mol, 1), 2);
    }

    #[test]
    fn bracket_atom_h() {
        assert_eq!(h(&parse("[CH4]"), 0), 4);
        assert_eq!(h(&parse("[C]"), 0), 0);
    }

    #[test]
    fn aromatic_carbon_benzene() {
        let mol = parse("c1ccccc1");
        for i in 0..6 {
            let atom = mol.atom(NodeIndex::new(i));
            assert!(atom.is_aromatic);
            assert_eq!(atom.hydrogen_count, 1, "atom {i} should have 1 H");
        }
        for edge in mol.bonds() {
            assert_eq!(mol.bond(edge).order, BondOrder::Aromatic);
        }
    }

    #[test]
    fn wildcard_has_no_hydrogens() {
        let mol = parse("*C");
        assert_eq!(mol.atom(NodeIndex::new(0)).atomic_num, 0);
        assert_eq!(h(&mol, 0), 0);
        assert_eq!(h(&mol, 1), 3);
    }

    #[test]
    fn directional_bonds_are_single() {
        let mol = parse(r"F/C=C\F");
        let first = mol.bond_between(NodeIndex::new(0), NodeIndex::new(1)).unwrap();
        let last = mol.bond_between(NodeIndex::new(2), NodeIndex::new(3)).unwrap();
        assert_eq!(mol.bond(first).order, BondOrder::Single);
        assert_eq!(mol.bond(first).direction, BondDirection::Up);
        assert_eq!(mol.bond(last).direction, BondDirection::Down);
    }

    #[test]
    fn chiral_atom_becomes_absolute_stereocenter() {
        let mol = parse("F[C@@H](Cl)Br");
        let center = mol.stereocenters().get(NodeIndex::new(1)).unwrap();
        assert_eq!(center.kind, StereocenterKind::Absolute);
        assert_eq!(mol.atom(NodeIndex::new(1)).chirality, Chirality::Cw);
        assert_eq!(mol.stereocenters().len(), 1);
    }
}

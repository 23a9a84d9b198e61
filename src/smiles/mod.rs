mod builder;
pub mod error;
mod parse_tree;
mod tokenizer;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::{Mol, ParsedMolecule};
pub use error::SmilesError;

/// Parser switches for [`parse_smiles_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmilesOptions {
    /// Accept `/` on one end of a ring closure and `\` on the other; the
    /// marker at the opening digit wins.
    pub ignore_closing_bond_direction_mismatch: bool,
    /// Parse as one group of a reaction: empty text is an empty molecule
    /// and atom classes become reaction atom-map numbers.
    pub in_reaction: bool,
}

pub fn parse_smiles(s: &str) -> Result<ParsedMolecule<Atom, Bond>, SmilesError> {
    parse_smiles_with(s, &SmilesOptions::default())
}

pub fn parse_smiles_with(
    s: &str,
    options: &SmilesOptions,
) -> Result<ParsedMolecule<Atom, Bond>, SmilesError> {
    let trimmed = s.trim();
    let tokens = tokenizer::tokenize(trimmed)?;
    if tokens.is_empty() {
        if options.in_reaction {
            return Ok(ParsedMolecule {
                mol: Mol::new(),
                atom_map: Vec::new(),
            });
        }
        return Err(SmilesError::EmptyInput);
    }
    let tree =
        parse_tree::build_parse_tree(&tokens, options.ignore_closing_bond_direction_mismatch)?;
    let mol = builder::build_mol(&tree);
    let atom_map = tree
        .atoms
        .iter()
        .map(|a| if options.in_reaction { a.atom_class } else { 0 })
        .collect();
    trace!(
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        "parsed SMILES"
    );
    Ok(ParsedMolecule { mol, atom_map })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Chirality;
    use crate::bond::{BondDirection, BondOrder};
    use crate::stereo::StereocenterKind;
    use petgraph::graph::NodeIndex;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn mol(s: &str) -> Mol<Atom, Bond> {
        parse_smiles(s).unwrap().mol
    }

    fn atom(mol: &Mol<Atom, Bond>, i: usize) -> &Atom {
        mol.atom(n(i))
    }

    // ---- Simple molecules ----

    #[test]
    fn methane() {
        let mol = mol("C");
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(atom(&mol, 0).atomic_num, 6);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);
    }

    #[test]
    fn ethyne() {
        let mol = mol("C#C");
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
        let edge = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(edge).order, BondOrder::Triple);
    }

    #[test]
    fn halides_take_one_hydrogen() {
        for (s, num) in [("F", 9), ("Cl", 17), ("Br", 35), ("I", 53)] {
            let mol = mol(s);
            assert_eq!(atom(&mol, 0).atomic_num, num, "{s}");
            assert_eq!(atom(&mol, 0).hydrogen_count, 1, "{s}");
        }
    }

    #[test]
    fn acetic_acid() {
        let mol = mol("CC(=O)O");
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(atom(&mol, 0).hydrogen_count, 3); // CH3
        assert_eq!(atom(&mol, 1).hydrogen_count, 0);
        assert_eq!(atom(&mol, 2).hydrogen_count, 0); // =O
        assert_eq!(atom(&mol, 3).hydrogen_count, 1); // OH
    }

    #[test]
    fn neopentane() {
        let mol = mol("CC(C)(C)C");
        assert_eq!(mol.atom_count(), 5);
        assert_eq!(mol.bond_count(), 4);
        assert_eq!(atom(&mol, 1).hydrogen_count, 0);
    }

    #[test]
    fn bicyclo() {
        let mol = mol("C1CC2C1CC2");
        assert_eq!(mol.atom_count(), 6);
        assert_eq!(mol.bond_count(), 7);
    }

    #[test]
    fn multi_digit_ring() {
        let mol = mol("C%10CC%10");
        assert_eq!(mol.atom_count(), 3);
        assert_eq!(mol.bond_count(), 3);
    }

    #[test]
    fn ammonium() {
        let mol = mol("[NH4+]");
        assert_eq!(atom(&mol, 0).atomic_num, 7);
        assert_eq!(atom(&mol, 0).formal_charge, 1);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);
    }

    #[test]
    fn deuterium() {
        let mol = mol("[2H]");
        assert_eq!(atom(&mol, 0).isotope, 2);
        assert_eq!(atom(&mol, 0).atomic_num, 1);
    }

    #[test]
    fn pyridine() {
        let mol = mol("c1ccncc1");
        assert_eq!(atom(&mol, 3).atomic_num, 7);
        assert_eq!(atom(&mol, 3).hydrogen_count, 0);
        for i in [0, 1, 2, 4, 5] {
            assert_eq!(atom(&mol, i).hydrogen_count, 1);
        }
    }

    #[test]
    fn pyrrole() {
        let mol = mol("[nH]1cccc1");
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
        for i in 1..5 {
            assert_eq!(atom(&mol, i).hydrogen_count, 1);
        }
    }

    #[test]
    fn phenol_ring_junction_is_single() {
        let mol = mol("Oc1ccccc1");
        assert_eq!(atom(&mol, 0).hydrogen_count, 1);
        let bond_o_c = mol.bond_between(n(0), n(1)).unwrap();
        assert_eq!(mol.bond(bond_o_c).order, BondOrder::Single);
    }

    #[test]
    fn caffeine_atom_count() {
        assert_eq!(mol("Cn1cnc2c1c(=O)n(c(=O)n2C)C").atom_count(), 14);
    }

    #[test]
    fn sodium_chloride() {
        let mol = mol("[Na+].[Cl-]");
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(atom(&mol, 0).formal_charge, 1);
        assert_eq!(atom(&mol, 1).formal_charge, -1);
    }

    // ---- Stereo markers ----

    #[test]
    fn chirality_kept_as_written() {
        assert_eq!(atom(&mol("[C@](F)(Cl)(Br)I"), 0).chirality, Chirality::Ccw);
        assert_eq!(atom(&mol("[C@@](F)(Cl)(Br)I"), 0).chirality, Chirality::Cw);
    }

    #[test]
    fn chiral_atoms_get_absolute_stereocenters() {
        let mol = mol("N[C@@H](C)C(=O)O");
        assert_eq!(mol.stereocenters().len(), 1);
        assert_eq!(
            mol.stereocenters().get(n(1)).unwrap().kind,
            StereocenterKind::Absolute
        );
    }

    #[test]
    fn bond_directions_recorded() {
        let mol = mol("F/C=C/F");
        let edge = mol.bond_between(n(2), n(3)).unwrap();
        assert_eq!(mol.bond(edge).direction, BondDirection::Up);
    }

    // ---- Atom map ----

    #[test]
    fn atom_classes_ignored_outside_reactions() {
        let parsed = parse_smiles("[CH3:1][OH:2]").unwrap();
        assert_eq!(parsed.atom_map, vec![0, 0]);
    }

    #[test]
    fn atom_classes_become_atom_map_in_reactions() {
        let options = SmilesOptions {
            in_reaction: true,
            ..SmilesOptions::default()
        };
        let parsed = parse_smiles_with("[CH3:1]C[OH:2]", &options).unwrap();
        assert_eq!(parsed.atom_map, vec![1, 0, 2]);
    }

    #[test]
    fn empty_group_in_reaction() {
        let options = SmilesOptions {
            in_reaction: true,
            ..SmilesOptions::default()
        };
        let parsed = parse_smiles_with("", &options).unwrap();
        assert_eq!(parsed.mol.atom_count(), 0);
        assert!(parsed.atom_map.is_empty());
    }

    #[test]
    fn ring_direction_mismatch_option() {
        let s = r"C/1=C/CCCC\1";
        assert!(parse_smiles(s).is_err());
        let options = SmilesOptions {
            ignore_closing_bond_direction_mismatch: true,
            ..SmilesOptions::default()
        };
        let mol = parse_smiles_with(s, &options).unwrap().mol;
        let closure = mol.bond_between(n(0), n(5)).unwrap();
        assert_eq!(mol.bond(closure).direction, BondDirection::Up);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: SmilesOptions = serde_json::from_str(r#"{"in_reaction": true}"#).unwrap();
        assert!(options.in_reaction);
        assert!(!options.ignore_closing_bond_direction_mismatch);
    }

    // ---- Error cases ----

    #[test]
    fn empty_string() {
        assert_eq!(parse_smiles("").unwrap_err(), SmilesError::EmptyInput);
        assert_eq!(parse_smiles("   ").unwrap_err(), SmilesError::EmptyInput);
    }

    #[test]
    fn malformed_inputs() {
        for s in ["C(C", "C)C", "C1CC", "X", "[C", "1CC"] {
            assert!(parse_smiles(s).is_err(), "{s} should fail");
        }
    }
}

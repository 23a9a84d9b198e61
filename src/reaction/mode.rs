use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::{Mol, ParsedMolecule};
use crate::smarts::{self, AtomExpr, BondExpr, SmartsOptions};
use crate::smiles::{self, SmilesOptions};
use crate::traits::{HasPseudoAtomMut, HasRadicalMut};

use super::error::ReactionSmilesError;
use super::group::Group;

/// How each group's text becomes a molecule: plain SMILES or SMARTS query.
pub trait ReactionMode {
    type Atom: Clone + HasRadicalMut + HasPseudoAtomMut;
    type Bond: Clone;

    /// Parses one group's text in reaction context.
    fn parse_group(
        text: &str,
        group: Group,
        ignore_closing_bond_direction_mismatch: bool,
    ) -> Result<ParsedMolecule<Self::Atom, Self::Bond>, ReactionSmilesError>;

    /// Checks a group molecule once every directive has been applied.
    fn validate_group(
        mol: &Mol<Self::Atom, Self::Bond>,
        group: Group,
    ) -> Result<(), ReactionSmilesError>;
}

/// Groups are SMILES; atoms are [`Atom`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoleculeMode;

/// Groups are SMARTS; atoms are [`AtomExpr`] queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryMode;

impl ReactionMode for MoleculeMode {
    type Atom = Atom;
    type Bond = Bond;

    fn parse_group(
        text: &str,
        group: Group,
        ignore_closing_bond_direction_mismatch: bool,
    ) -> Result<ParsedMolecule<Atom, Bond>, ReactionSmilesError> {
        let options = SmilesOptions {
            ignore_closing_bond_direction_mismatch,
            in_reaction: true,
        };
        smiles::parse_smiles_with(text, &options)
            .map_err(|source| ReactionSmilesError::Smiles { group, source })
    }

    fn validate_group(_mol: &Mol<Atom, Bond>, _group: Group) -> Result<(), ReactionSmilesError> {
        Ok(())
    }
}

impl ReactionMode for QueryMode {
    type Atom = AtomExpr;
    type Bond = BondExpr;

    fn parse_group(
        text: &str,
        group: Group,
        ignore_closing_bond_direction_mismatch: bool,
    ) -> Result<ParsedMolecule<AtomExpr, BondExpr>, ReactionSmilesError> {
        let options = SmartsOptions {
            ignore_closing_bond_direction_mismatch,
            in_reaction: true,
        };
        smarts::parse_smarts_with(text, &options)
            .map_err(|source| ReactionSmilesError::Smarts { group, source })
    }

    fn validate_group(
        mol: &Mol<AtomExpr, BondExpr>,
        group: Group,
    ) -> Result<(), ReactionSmilesError> {
        smarts::check_query_atoms(mol)
            .map_err(|source| ReactionSmilesError::InvalidQueryAtom { group, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::SmilesError;

    #[test]
    fn molecule_mode_reports_group() {
        let err = MoleculeMode::parse_group("C(", Group::Agent, false).unwrap_err();
        assert!(matches!(
            err,
            ReactionSmilesError::Smiles {
                group: Group::Agent,
                source: SmilesError::UnmatchedParen { .. }
            }
        ));
    }

    #[test]
    fn molecule_mode_reads_atom_map() {
        let parsed = MoleculeMode::parse_group("[CH3:4]O", Group::Reactant, false).unwrap();
        assert_eq!(parsed.atom_map, vec![4, 0]);
    }

    #[test]
    fn query_mode_reads_atom_map() {
        let parsed = QueryMode::parse_group("[C:4][O:1]", Group::Product, false).unwrap();
        assert_eq!(parsed.atom_map, vec![4, 1]);
    }

    #[test]
    fn query_mode_validation() {
        let mut parsed = QueryMode::parse_group("C", Group::Product, false).unwrap();
        let atom = petgraph::graph::NodeIndex::new(0);
        parsed.mol.atom_mut(atom).set_pseudo_atom("R1");
        assert!(QueryMode::validate_group(&parsed.mol, Group::Product).is_ok());
        parsed.mol.atom_mut(atom).set_pseudo_atom("R2");
        assert!(matches!(
            QueryMode::validate_group(&parsed.mol, Group::Product),
            Err(ReactionSmilesError::InvalidQueryAtom {
                group: Group::Product,
                ..
            })
        ));
    }
}

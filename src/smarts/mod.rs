mod error;
mod parser;
pub mod query;
mod validate;

pub use error::SmartsError;
pub use query::{AtomExpr, BondExpr};
pub use validate::check_query_atoms;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::mol::{Mol, ParsedMolecule};

/// Parser switches for [`parse_smarts_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartsOptions {
    /// Accept `/` on one end of a ring closure and `\` on the other; the
    /// marker at the opening digit wins.
    pub ignore_closing_bond_direction_mismatch: bool,
    /// Parse as one group of a reaction query: empty text is an empty
    /// query, atom map classes move out of the expressions into
    /// `atom_map`, and validation is left to the caller.
    pub in_reaction: bool,
}

pub fn parse_smarts(s: &str) -> Result<ParsedMolecule<AtomExpr, BondExpr>, SmartsError> {
    parse_smarts_with(s, &SmartsOptions::default())
}

pub fn parse_smarts_with(
    s: &str,
    options: &SmartsOptions,
) -> Result<ParsedMolecule<AtomExpr, BondExpr>, SmartsError> {
    if options.in_reaction && s.trim().is_empty() {
        return Ok(ParsedMolecule {
            mol: Mol::new(),
            atom_map: Vec::new(),
        });
    }

    let mut mol = parser::parse(s, options.ignore_closing_bond_direction_mismatch)?;

    let atom_map = if options.in_reaction {
        let atoms: Vec<_> = mol.atoms().collect();
        atoms
            .into_iter()
            .map(|idx| mol.atom_mut(idx).take_map_class())
            .collect()
    } else {
        check_query_atoms(&mol)?;
        vec![0; mol.atom_count()]
    };

    trace!(
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        "parsed SMARTS"
    );
    Ok(ParsedMolecule { mol, atom_map })
}

use crate::element::Element;
use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, ChiralityToken, Token};

#[derive(Debug, Clone)]
pub struct ParseAtom {
    pub element: Option<Element>,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub chirality: ChiralityToken,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub atom_class: u32,
    pub is_bracket: bool,
    pub neighbors: Vec<Neighbor>,
}

#[derive(Debug, Clone)]
pub struct Neighbor {
    pub bond: Option<BondToken>,
    pub atom_idx: usize,
}

#[derive(Debug, Clone)]
pub struct ParseTree {
    pub atoms: Vec<ParseAtom>,
}

/// Builds the atom adjacency from a token stream.
///
/// With `ignore_direction_mismatch`, a ring closure whose two ends carry
/// opposite `/` `\` markers keeps the marker written at the opening digit
/// instead of failing with [`SmilesError::RingBondConflict`].
pub fn build_parse_tree(
    tokens: &[Token],
    ignore_direction_mismatch: bool,
) -> Result<ParseTree, SmilesError> {
    let mut atoms: Vec<ParseAtom> = Vec::new();
    let mut stack: Vec<usize> = Vec::new(); // branch points
    let mut current: Option<usize> = None;
    let mut pending_bond: Option<BondToken> = None;
    let mut ring_opens: Vec<Option<(usize, Option<BondToken>)>> = vec![None; 100];

    for token in tokens {
        match token {
            Token::Atom(atom_tok) => {
                let idx = atoms.len();
                atoms.push(parse_atom_from_token(atom_tok));

                if let Some(cur) = current {
                    let bond = pending_bond.take();
                    link(&mut atoms, cur, idx, bond);
                } else {
                    pending_bond = None;
                }

                current = Some(idx);
            }
            Token::Bond(b) => {
                pending_bond = Some(*b);
            }
            Token::RingClosure { bond, digit, pos } => {
                let d = *digit as usize;
                let cur = current.ok_or(SmilesError::InvalidRingBond {
                    digit: *digit,
                    pos: *pos,
                })?;
                let written = bond.or(pending_bond.take());

                if let Some((open_idx, open_bond)) = ring_opens[d].take() {
                    let ring_bond =
                        merge_ring_bonds(open_bond, written, *digit, ignore_direction_mismatch)?;
                    link(&mut atoms, open_idx, cur, ring_bond);
                } else {
                    ring_opens[d] = Some((cur, written));
                }
            }
            Token::OpenParen(pos) => {
                let cur = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                stack.push(cur);
            }
            Token::CloseParen(pos) => {
                current = Some(stack.pop().ok_or(SmilesError::UnmatchedParen { pos: *pos })?);
                pending_bond = None;
            }
            Token::Dot(_) => {
                current = None;
                pending_bond = None;
            }
        }
    }

    if !stack.is_empty() {
        return Err(SmilesError::UnmatchedParen { pos: 0 });
    }

    if let Some(digit) = ring_opens.iter().position(Option::is_some) {
        return Err(SmilesError::UnclosedRing {
            digit: digit as u16,
        });
    }

    Ok(ParseTree { atoms })
}

fn link(atoms: &mut [ParseAtom], a: usize, b: usize, bond: Option<BondToken>) {
    atoms[a].neighbors.push(Neighbor { bond, atom_idx: b });
    atoms[b].neighbors.push(Neighbor { bond, atom_idx: a });
}

fn merge_ring_bonds(
    open: Option<BondToken>,
    close: Option<BondToken>,
    digit: u16,
    ignore_direction_mismatch: bool,
) -> Result<Option<BondToken>, SmilesError> {
    match (open, close) {
        (None, None) => Ok(None),
        (Some(b), None) | (None, Some(b)) => Ok(Some(b)),
        (Some(b1), Some(b2)) if b1 == b2 => Ok(Some(b1)),
        (Some(b1), Some(b2))
            if ignore_direction_mismatch && b1.is_directional() && b2.is_directional() =>
        {
            Ok(Some(b1))
        }
        _ => Err(SmilesError::RingBondConflict { digit }),
    }
}

fn parse_atom_from_token(tok: &AtomToken) -> ParseAtom {
    ParseAtom {
        element: tok.element,
        is_aromatic: tok.is_aromatic,
        isotope: tok.isotope,
        chirality: tok.chirality,
        hcount: tok.hcount,
        charge: tok.charge,
        atom_class: tok.atom_class,
        is_bracket: tok.is_bracket,
        neighbors: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::tokenizer::tokenize;

    fn tree(s: &str) -> Result<ParseTree, SmilesError> {
        build_parse_tree(&tokenize(s).unwrap(), false)
    }

    #[test]
    fn ethane_tree() {
        let tree = tree("CC").unwrap();
        assert_eq!(tree.atoms.len(), 2);
        assert_eq!(tree.atoms[0].neighbors.len(), 1);
        assert_eq!(tree.atoms[0].neighbors[0].atom_idx, 1);
    }

    #[test]
    fn cyclohexane_tree() {
        let tree = tree("C1CCCCC1").unwrap();
        assert_eq!(tree.atoms.len(), 6);
        for atom in &tree.atoms {
            assert_eq!(atom.neighbors.len(), 2);
        }
    }

    #[test]
    fn branch_tree() {
        let tree = tree("CC(C)C").unwrap();
        assert_eq!(tree.atoms.len(), 4);
        assert_eq!(tree.atoms[1].neighbors.len(), 3);
    }

    #[test]
    fn unclosed_ring_error() {
        assert_eq!(
            tree("C1CC").unwrap_err(),
            SmilesError::UnclosedRing { digit: 1 }
        );
    }

    #[test]
    fn unmatched_paren_error() {
        assert!(tree("C(C").is_err());
    }

    #[test]
    fn disconnected() {
        let tree = tree("[Na+].[Cl-]").unwrap();
        assert_eq!(tree.atoms.len(), 2);
        assert!(tree.atoms[0].neighbors.is_empty());
        assert!(tree.atoms[1].neighbors.is_empty());
    }

    #[test]
    fn ring_direction_mismatch_is_an_error_by_default() {
        assert_eq!(
            tree(r"C/1CCCC\1").unwrap_err(),
            SmilesError::RingBondConflict { digit: 1 }
        );
    }

    #[test]
    fn ring_direction_mismatch_keeps_opening_marker() {
        let tokens = tokenize(r"C/1CCCC\1").unwrap();
        let tree = build_parse_tree(&tokens, true).unwrap();
        let closure = tree.atoms[0]
            .neighbors
            .iter()
            .find(|n| n.atom_idx == 4)
            .unwrap();
        assert_eq!(closure.bond, Some(BondToken::Up));
    }

    #[test]
    fn ignoring_direction_still_rejects_order_conflict() {
        let tokens = tokenize("C=1CCCC#1").unwrap();
        assert!(build_parse_tree(&tokens, true).is_err());
    }
}

use crate::atom::Radical;
use crate::mol::Mol;

use super::error::SmartsError;
use super::query::{AtomExpr, BondExpr};

/// Rejects query atoms that can never be satisfied as written.
///
/// An atom fails if its top-level conjunction requires two different
/// radical states, pseudo-atom labels or atom map classes, or if any
/// `And`/`Or` node in its expression has no operands.
pub fn check_query_atoms(mol: &Mol<AtomExpr, BondExpr>) -> Result<(), SmartsError> {
    for idx in mol.atoms() {
        let atom = idx.index();
        let expr = mol.atom(idx);
        if has_empty_node(expr) {
            return Err(SmartsError::EmptyExpression { atom });
        }

        let mut radical: Option<Radical> = None;
        let mut label: Option<&str> = None;
        let mut map_class: Option<u32> = None;
        for conjunct in expr.conjuncts() {
            match conjunct {
                AtomExpr::Radical(r) => require(&mut radical, *r, atom, "radical")?,
                AtomExpr::PseudoAtom(l) => require(&mut label, l.as_str(), atom, "pseudo-atom")?,
                AtomExpr::AtomMapClass(n) => require(&mut map_class, *n, atom, "atom map class")?,
                _ => {}
            }
        }
    }
    Ok(())
}

fn require<T: PartialEq>(
    slot: &mut Option<T>,
    value: T,
    atom: usize,
    property: &'static str,
) -> Result<(), SmartsError> {
    match slot {
        Some(existing) if *existing != value => {
            Err(SmartsError::ConflictingQueryAtom { atom, property })
        }
        Some(_) => Ok(()),
        None => {
            *slot = Some(value);
            Ok(())
        }
    }
}

fn has_empty_node(expr: &AtomExpr) -> bool {
    match expr {
        AtomExpr::And(parts) | AtomExpr::Or(parts) => {
            parts.is_empty() || parts.iter().any(has_empty_node)
        }
        AtomExpr::Not(inner) => has_empty_node(inner),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smarts::parse_smarts;
    use crate::traits::{HasPseudoAtomMut, HasRadicalMut};
    use petgraph::graph::NodeIndex;

    fn query(s: &str) -> Mol<AtomExpr, BondExpr> {
        parse_smarts(s).unwrap().mol
    }

    #[test]
    fn plain_queries_pass() {
        assert!(check_query_atoms(&query("[C;R][N,O]C=O")).is_ok());
    }

    #[test]
    fn repeated_identical_radical_is_fine() {
        let mut q = query("C");
        q.atom_mut(NodeIndex::new(0)).set_radical(Radical::Doublet);
        q.atom_mut(NodeIndex::new(0)).set_radical(Radical::Doublet);
        assert!(check_query_atoms(&q).is_ok());
    }

    #[test]
    fn conflicting_radicals_fail() {
        let mut q = query("CC");
        q.atom_mut(NodeIndex::new(1)).set_radical(Radical::Doublet);
        q.atom_mut(NodeIndex::new(1)).set_radical(Radical::Triplet);
        assert_eq!(
            check_query_atoms(&q).unwrap_err(),
            SmartsError::ConflictingQueryAtom {
                atom: 1,
                property: "radical"
            }
        );
    }

    #[test]
    fn conflicting_labels_fail() {
        let mut q = query("*");
        q.atom_mut(NodeIndex::new(0)).set_pseudo_atom("R1");
        q.atom_mut(NodeIndex::new(0)).set_pseudo_atom("R2");
        assert!(matches!(
            check_query_atoms(&q),
            Err(SmartsError::ConflictingQueryAtom { atom: 0, .. })
        ));
    }

    #[test]
    fn conflicting_map_classes_fail() {
        assert!(matches!(
            crate::smarts::parse_smarts("[C:1&:2]"),
            Err(SmartsError::ConflictingQueryAtom {
                property: "atom map class",
                ..
            })
        ));
    }

    #[test]
    fn empty_and_fails() {
        let mut q = query("C");
        *q.atom_mut(NodeIndex::new(0)) = AtomExpr::Not(Box::new(AtomExpr::And(vec![])));
        assert_eq!(
            check_query_atoms(&q).unwrap_err(),
            SmartsError::EmptyExpression { atom: 0 }
        );
    }
}

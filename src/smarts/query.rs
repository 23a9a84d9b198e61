use crate::atom::{Chirality, Radical};
use crate::mol::Mol;
use crate::traits::{HasPseudoAtomMut, HasRadicalMut};

/// AST node for a SMARTS atom query expression.
///
/// Each variant represents a primitive test or a logical combination of
/// tests. Trees are treated as immutable values: annotation directives
/// build a new [`AtomExpr::And`] around the old expression instead of
/// editing shared subtrees.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AtomExpr {
    /// Matches any atom (wildcard `*`).
    #[default]
    True,
    /// Matches by element. `aromatic` is `None` for `#n` (either), `Some(true)`
    /// for lowercase (`c`), `Some(false)` for uppercase (`C`).
    Element {
        atomic_num: u8,
        aromatic: Option<bool>,
    },
    /// Matches any aromatic atom (`a`).
    Aromatic,
    /// Matches any aliphatic atom (`A`).
    Aliphatic,
    /// Matches a specific isotope number.
    Isotope(u16),
    /// Explicit degree (`D`).
    Degree(u8),
    /// Total valence (`v`).
    Valence(u8),
    /// Total connectivity (`X`).
    Connectivity(u8),
    /// Total hydrogen count (`H`).
    TotalHCount(u8),
    /// Implicit hydrogen count (`h`).
    ImplicitHCount(u8),
    /// Number of rings containing the atom (`R<n>`).
    RingMembership(u8),
    /// Smallest ring size (`r<n>`).
    SmallestRingSize(u8),
    /// Number of ring bonds (`x`).
    RingBondCount(u8),
    Charge(i8),
    /// `R` or `r` without a count.
    InRing,
    /// `R0`.
    NotInRing,
    /// A recursive SMARTS sub-query (`$(...)`).
    Recursive(Box<Mol<AtomExpr, BondExpr>>),
    /// Atom map class (`:n`).
    AtomMapClass(u32),
    /// Tetrahedral chirality (`@` or `@@`), as written.
    Chirality(Chirality),
    /// Radical state, attached by a `^` directive.
    Radical(Radical),
    /// Pseudo-atom label, attached by a `$` directive.
    PseudoAtom(String),
    /// Logical AND of sub-expressions.
    And(Vec<AtomExpr>),
    /// Logical OR of sub-expressions.
    Or(Vec<AtomExpr>),
    /// Logical NOT of a sub-expression.
    Not(Box<AtomExpr>),
}

/// AST node for a SMARTS bond query expression.
///
/// Implicit bonds in SMARTS default to [`BondExpr::SingleOrAromatic`], unlike
/// SMILES where implicit bonds are always single.
#[derive(Debug, Clone, PartialEq)]
pub enum BondExpr {
    /// Any bond (`~`).
    True,
    Single,
    Double,
    Triple,
    /// Aromatic bond (`:`).
    Aromatic,
    /// Ring bond (`@`).
    Ring,
    /// Default SMARTS bond: single or aromatic.
    SingleOrAromatic,
    /// Up directional bond (`/`).
    Up,
    /// Down directional bond (`\`).
    Down,
    And(Vec<BondExpr>),
    Or(Vec<BondExpr>),
    Not(Box<BondExpr>),
}

impl AtomExpr {
    /// Conjoins `other` onto `self`, flattening nested `And` nodes.
    pub fn and(self, other: AtomExpr) -> AtomExpr {
        let mut parts = match self {
            AtomExpr::And(parts) => parts,
            AtomExpr::True => return other,
            expr => vec![expr],
        };
        match other {
            AtomExpr::And(more) => parts.extend(more),
            expr => parts.push(expr),
        }
        AtomExpr::And(parts)
    }

    /// Top-level conjuncts: the operands of an `And`, or the expression itself.
    pub fn conjuncts(&self) -> &[AtomExpr] {
        match self {
            AtomExpr::And(parts) => parts,
            expr => std::slice::from_ref(expr),
        }
    }

    /// The atom map class required by a top-level conjunct, if any.
    pub fn map_class(&self) -> Option<u32> {
        self.conjuncts().iter().find_map(|e| match e {
            AtomExpr::AtomMapClass(n) => Some(*n),
            _ => None,
        })
    }

    pub fn has_chirality(&self) -> bool {
        self.conjuncts()
            .iter()
            .any(|e| matches!(e, AtomExpr::Chirality(c) if *c != Chirality::None))
    }

    /// Removes every top-level `AtomMapClass` conjunct and returns the first
    /// class removed (`0` if none).
    pub(crate) fn take_map_class(&mut self) -> u32 {
        let class = self.map_class().unwrap_or(0);
        let expr = std::mem::take(self);
        *self = match expr {
            AtomExpr::AtomMapClass(_) => AtomExpr::True,
            AtomExpr::And(parts) => {
                let mut kept: Vec<AtomExpr> = parts
                    .into_iter()
                    .filter(|e| !matches!(e, AtomExpr::AtomMapClass(_)))
                    .collect();
                match kept.len() {
                    0 => AtomExpr::True,
                    1 => kept.remove(0),
                    _ => AtomExpr::And(kept),
                }
            }
            other => other,
        };
        class
    }
}

impl HasRadicalMut for AtomExpr {
    fn set_radical(&mut self, radical: Radical) {
        let old = std::mem::take(self);
        *self = old.and(AtomExpr::Radical(radical));
    }
}

impl HasPseudoAtomMut for AtomExpr {
    fn set_pseudo_atom(&mut self, label: &str) {
        let old = std::mem::take(self);
        *self = old.and(AtomExpr::PseudoAtom(label.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carbon() -> AtomExpr {
        AtomExpr::Element {
            atomic_num: 6,
            aromatic: Some(false),
        }
    }

    #[test]
    fn and_flattens() {
        let expr = AtomExpr::And(vec![carbon(), AtomExpr::InRing]).and(AtomExpr::Charge(1));
        assert_eq!(
            expr,
            AtomExpr::And(vec![carbon(), AtomExpr::InRing, AtomExpr::Charge(1)])
        );
    }

    #[test]
    fn and_with_true_is_identity() {
        assert_eq!(AtomExpr::True.and(carbon()), carbon());
    }

    #[test]
    fn and_keeps_or_as_one_operand() {
        let or = AtomExpr::Or(vec![carbon(), AtomExpr::Aromatic]);
        let expr = or.clone().and(AtomExpr::Degree(2));
        assert_eq!(expr, AtomExpr::And(vec![or, AtomExpr::Degree(2)]));
    }

    #[test]
    fn radical_conjoins() {
        let mut expr = carbon();
        expr.set_radical(Radical::Triplet);
        assert_eq!(
            expr,
            AtomExpr::And(vec![carbon(), AtomExpr::Radical(Radical::Triplet)])
        );
    }

    #[test]
    fn pseudo_atom_conjoins_wildcard() {
        let mut expr = AtomExpr::True;
        expr.set_pseudo_atom("R1");
        assert_eq!(expr, AtomExpr::PseudoAtom("R1".into()));
    }

    #[test]
    fn take_map_class_strips_conjunct() {
        let mut expr = AtomExpr::And(vec![carbon(), AtomExpr::AtomMapClass(7)]);
        assert_eq!(expr.take_map_class(), 7);
        assert_eq!(expr, carbon());

        let mut bare = AtomExpr::AtomMapClass(2);
        assert_eq!(bare.take_map_class(), 2);
        assert_eq!(bare, AtomExpr::True);

        let mut none = carbon();
        assert_eq!(none.take_map_class(), 0);
    }
}

use crate::atom::Radical;

/// Atoms that can take a radical marker.
///
/// Plain atoms overwrite their radical state; query atoms conjoin a radical
/// constraint onto their existing expression.
pub trait HasRadicalMut {
    fn set_radical(&mut self, radical: Radical);
}

/// Atoms that can be turned into (or constrained to) a labelled pseudo-atom.
pub trait HasPseudoAtomMut {
    fn set_pseudo_atom(&mut self, label: &str);
}

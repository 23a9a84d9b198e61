/// Tetrahedral chirality tag as written in the input (`@` / `@@`).
///
/// The tag is relative to the order in which neighbors appear in the text;
/// it is not normalized to graph neighbor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    /// No chirality constraint.
    #[default]
    None,
    /// Clockwise (@@) arrangement.
    Cw,
    /// Counterclockwise (@) arrangement.
    Ccw,
}

/// Radical state of an atom, as set by `^` annotation directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Radical {
    #[default]
    None,
    Singlet,
    Doublet,
    Triplet,
}

/// Default atom type for a molecular graph node.
///
/// `Atom` stores intrinsic atomic properties read off the text, plus the
/// markers an annotation block can attach (radical state, pseudo-atom
/// label). It omits computed properties like valence or coordinates.
///
/// # Examples
///
/// ```
/// use crabrxn::Atom;
///
/// let carbon = Atom {
///     atomic_num: 6,
///     hydrogen_count: 3,
///     ..Atom::default()
/// };
/// assert_eq!(carbon.atomic_num, 6);
/// assert!(carbon.pseudo_atom.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, …). `0` for the `*` wildcard.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Number of implicit hydrogens on this atom.
    pub hydrogen_count: u8,
    /// Written as a lowercase (aromatic) symbol.
    pub is_aromatic: bool,
    pub chirality: Chirality,
    pub radical: Radical,
    /// Free-text label replacing the element identity, e.g. `R1`.
    pub pseudo_atom: Option<String>,
}

impl Atom {
    pub fn is_pseudo(&self) -> bool {
        self.pseudo_atom.is_some()
    }
}

impl crate::traits::HasRadicalMut for Atom {
    fn set_radical(&mut self, radical: Radical) {
        self.radical = radical;
    }
}

impl crate::traits::HasPseudoAtomMut for Atom {
    fn set_pseudo_atom(&mut self, label: &str) {
        self.pseudo_atom = Some(label.to_owned());
    }
}

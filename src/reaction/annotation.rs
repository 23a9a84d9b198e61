//! The `|...|` block that may follow the product group.
//!
//! The block is read in one pass into a list of [`Directive`]s, which are
//! then applied in order to the three group molecules. Atom indices in
//! stereo, radical and pseudo-atom directives, and component indices in
//! `f`, count through reactants, then agents, then products. Highlight
//! indices are kept global and only resolved when molecules are regrouped.

use petgraph::graph::NodeIndex;
use tracing::trace;

use crate::atom::Radical;
use crate::mol::Mol;
use crate::stereo::StereocenterKind;
use crate::traits::{HasPseudoAtomMut, HasRadicalMut};

use super::error::ReactionSmilesError;
use super::group::{GlobalIndex, GroupSizes};
use super::highlight::HighlightFlags;
use super::regroup::ComponentArena;
use super::scanner::Scanner;

/// `L.x.y` inside an `f:` list: components `x`, `y` join component `L`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentMerge {
    pub lead: GlobalIndex,
    pub leaves: Vec<GlobalIndex>,
}

/// One directive of an annotation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `w:` stereocenters of unknown configuration.
    AnyStereo(Vec<GlobalIndex>),
    /// `a:`
    AbsoluteStereo(Vec<GlobalIndex>),
    /// `o<N>:`
    OrGroup { group: u32, atoms: Vec<GlobalIndex> },
    /// `&<N>:`
    AndGroup { group: u32, atoms: Vec<GlobalIndex> },
    /// `^<D>:`
    Radical {
        radical: Radical,
        atoms: Vec<GlobalIndex>,
    },
    /// `f:`
    Fragments(Vec<FragmentMerge>),
    /// `$...$`, non-empty labels only.
    PseudoAtoms(Vec<(GlobalIndex, String)>),
    /// `ha:` global atom indices.
    HighlightAtoms(Vec<usize>),
    /// `hb:` global bond indices.
    HighlightBonds(Vec<usize>),
}

const BLOCK: &str = "annotation block";
const PSEUDO_ATOMS: &str = "pseudo-atom block";

/// Reads directives up to and including the closing `|`.
///
/// `total_atoms` is the number of atoms over all three groups; a `$` block
/// must hold exactly that many label slots.
pub fn parse_annotation_block(
    scanner: &mut Scanner<'_>,
    total_atoms: usize,
) -> Result<Vec<Directive>, ReactionSmilesError> {
    let mut directives = Vec::new();
    loop {
        let pos = scanner.pos();
        let directive = match scanner.read_char(BLOCK)? {
            '|' => break,
            ',' => continue,
            'w' => {
                expect_colon(scanner, 'w')?;
                Directive::AnyStereo(read_atoms(scanner, 'w')?)
            }
            'a' => {
                expect_colon(scanner, 'a')?;
                Directive::AbsoluteStereo(read_atoms(scanner, 'a')?)
            }
            'o' => {
                let group = read_group_number(scanner, 'o')?;
                expect_colon(scanner, 'o')?;
                Directive::OrGroup {
                    group,
                    atoms: read_atoms(scanner, 'o')?,
                }
            }
            '&' => {
                let group = read_group_number(scanner, '&')?;
                expect_colon(scanner, '&')?;
                Directive::AndGroup {
                    group,
                    atoms: read_atoms(scanner, '&')?,
                }
            }
            '^' => {
                let radical = read_radical(scanner)?;
                expect_colon(scanner, '^')?;
                Directive::Radical {
                    radical,
                    atoms: read_atoms(scanner, '^')?,
                }
            }
            'f' => {
                expect_colon(scanner, 'f')?;
                Directive::Fragments(read_fragments(scanner)?)
            }
            '$' => Directive::PseudoAtoms(read_pseudo_atoms(scanner, total_atoms)?),
            'h' => match scanner.look_next() {
                Some('a') => {
                    scanner.skip(1);
                    expect_colon(scanner, 'h')?;
                    Directive::HighlightAtoms(read_indices(scanner, 'h')?)
                }
                Some('b') => {
                    scanner.skip(1);
                    expect_colon(scanner, 'h')?;
                    Directive::HighlightBonds(read_indices(scanner, 'h')?)
                }
                found => {
                    return Err(ReactionSmilesError::MalformedDirective {
                        directive: 'h',
                        pos: scanner.pos(),
                        expected: "'a' or 'b'",
                        found,
                    });
                }
            },
            ch => return Err(ReactionSmilesError::UnknownDirective { ch, pos }),
        };
        directives.push(directive);
    }
    Ok(directives)
}

fn expect_colon(scanner: &mut Scanner<'_>, directive: char) -> Result<(), ReactionSmilesError> {
    if scanner.eat(':') {
        return Ok(());
    }
    Err(ReactionSmilesError::MalformedDirective {
        directive,
        pos: scanner.pos(),
        expected: "':'",
        found: scanner.look_next(),
    })
}

/// Comma-separated numbers; stops at the first non-digit.
fn read_indices(scanner: &mut Scanner<'_>, directive: char) -> Result<Vec<usize>, ReactionSmilesError> {
    let mut indices = Vec::new();
    while scanner.look_next().is_some_and(|c| c.is_ascii_digit()) {
        indices.push(scanner.read_unsigned(directive)?);
        scanner.eat(',');
    }
    Ok(indices)
}

fn read_atoms(
    scanner: &mut Scanner<'_>,
    directive: char,
) -> Result<Vec<GlobalIndex>, ReactionSmilesError> {
    Ok(read_indices(scanner, directive)?
        .into_iter()
        .map(GlobalIndex)
        .collect())
}

fn read_group_number(scanner: &mut Scanner<'_>, directive: char) -> Result<u32, ReactionSmilesError> {
    let pos = scanner.pos();
    let n = scanner.read_unsigned(directive)?;
    u32::try_from(n).map_err(|_| ReactionSmilesError::NumberTooLarge { directive, pos })
}

fn read_radical(scanner: &mut Scanner<'_>) -> Result<Radical, ReactionSmilesError> {
    let pos = scanner.pos();
    let code = scanner
        .read_digit()
        .ok_or_else(|| ReactionSmilesError::MalformedDirective {
            directive: '^',
            pos,
            expected: "radical code",
            found: scanner.look_next(),
        })?;
    match code {
        1 => Ok(Radical::Doublet),
        3 => Ok(Radical::Singlet),
        4 => Ok(Radical::Triplet),
        code => Err(ReactionSmilesError::UnsupportedRadical { code, pos }),
    }
}

fn read_fragments(scanner: &mut Scanner<'_>) -> Result<Vec<FragmentMerge>, ReactionSmilesError> {
    let mut merges = Vec::new();
    while scanner.look_next().is_some_and(|c| c.is_ascii_digit()) {
        let lead = GlobalIndex(scanner.read_unsigned('f')?);
        let mut leaves = Vec::new();
        while scanner.eat('.') {
            leaves.push(GlobalIndex(scanner.read_unsigned('f')?));
        }
        scanner.eat(',');
        merges.push(FragmentMerge { lead, leaves });
    }
    Ok(merges)
}

/// One label slot per atom, `;`-separated and closed by `$`.
fn read_pseudo_atoms(
    scanner: &mut Scanner<'_>,
    total_atoms: usize,
) -> Result<Vec<(GlobalIndex, String)>, ReactionSmilesError> {
    let mut labels = Vec::new();
    if total_atoms == 0 {
        scanner.eat('$');
        return Ok(labels);
    }
    for i in 0..total_atoms {
        let mut label = String::new();
        let terminator = loop {
            match scanner.read_char(PSEUDO_ATOMS)? {
                c @ (';' | '$') => break c,
                c => label.push(c),
            }
        };
        let last = i + 1 == total_atoms;
        if terminator == '$' && !last {
            return Err(ReactionSmilesError::CountMismatch {
                expected: total_atoms,
                found: i + 1,
            });
        }
        if terminator == ';' && last {
            return Err(ReactionSmilesError::MalformedDirective {
                directive: '$',
                pos: scanner.pos() - 1,
                expected: "'$'",
                found: Some(';'),
            });
        }
        if !label.is_empty() {
            labels.push((GlobalIndex(i), label));
        }
    }
    Ok(labels)
}

/// Everything directives may touch while a reaction is being loaded.
#[derive(Debug)]
pub struct AnnotationState<A, B> {
    pub molecules: [Mol<A, B>; 3],
    pub atoms: GroupSizes,
    pub components: GroupSizes,
    pub arenas: [ComponentArena; 3],
    pub highlights: HighlightFlags,
    /// Set by any `h` directive.
    pub highlighting_requested: bool,
}

impl<A: HasRadicalMut + HasPseudoAtomMut, B> AnnotationState<A, B> {
    pub fn apply_all(&mut self, directives: &[Directive]) -> Result<(), ReactionSmilesError> {
        directives.iter().try_for_each(|d| self.apply(d))
    }

    pub fn apply(&mut self, directive: &Directive) -> Result<(), ReactionSmilesError> {
        trace!(?directive, "applying annotation directive");
        match directive {
            Directive::AnyStereo(atoms) => {
                for &idx in atoms {
                    let (mol, atom) = self.atom_target(idx)?;
                    mol.stereocenters_mut().add(atom, StereocenterKind::Any, 0);
                }
            }
            Directive::AbsoluteStereo(atoms) => {
                self.set_stereo_kind(atoms, StereocenterKind::Absolute, 0)?;
            }
            Directive::OrGroup { group, atoms } => {
                self.set_stereo_kind(atoms, StereocenterKind::Or, *group)?;
            }
            Directive::AndGroup { group, atoms } => {
                self.set_stereo_kind(atoms, StereocenterKind::And, *group)?;
            }
            Directive::Radical { radical, atoms } => {
                for &idx in atoms {
                    let (mol, atom) = self.atom_target(idx)?;
                    mol.atom_mut(atom).set_radical(*radical);
                }
            }
            Directive::Fragments(merges) => {
                for merge in merges {
                    // resolving the lead against itself checks it is in range
                    self.components.resolve_pair(merge.lead, merge.lead)?;
                    for &leaf in &merge.leaves {
                        let (group, lead, leaf) = self.components.resolve_pair(merge.lead, leaf)?;
                        self.arenas[group.index()].forward(leaf, lead)?;
                    }
                }
            }
            Directive::PseudoAtoms(labels) => {
                for (idx, label) in labels {
                    let (mol, atom) = self.atom_target(*idx)?;
                    mol.atom_mut(atom).set_pseudo_atom(label);
                }
            }
            Directive::HighlightAtoms(atoms) => {
                self.highlighting_requested = true;
                for &idx in atoms {
                    self.highlights.mark_atom(idx)?;
                }
            }
            Directive::HighlightBonds(bonds) => {
                self.highlighting_requested = true;
                for &idx in bonds {
                    self.highlights.mark_bond(idx)?;
                }
            }
        }
        Ok(())
    }

    fn atom_target(&mut self, idx: GlobalIndex) -> Result<(&mut Mol<A, B>, NodeIndex), ReactionSmilesError> {
        let (group, local) = self.atoms.resolve(idx)?;
        Ok((&mut self.molecules[group.index()], NodeIndex::new(local)))
    }

    fn set_stereo_kind(
        &mut self,
        atoms: &[GlobalIndex],
        kind: StereocenterKind,
        group: u32,
    ) -> Result<(), ReactionSmilesError> {
        for &idx in atoms {
            let (mol, atom) = self.atom_target(idx)?;
            mol.stereocenters_mut().set_kind(atom, kind, group);
        }
        Ok(())
    }
}

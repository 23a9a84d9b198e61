use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::graph_ops::decompose;
use crate::mol::ParsedMolecule;
use crate::smarts::{AtomExpr, BondExpr};

use super::annotation::{parse_annotation_block, AnnotationState};
use super::container::Reaction;
use super::error::{IndexSpace, ReactionSmilesError};
use super::group::{Group, GroupSizes};
use super::highlight::{HighlightFlags, ReactionHighlighting};
use super::mode::{MoleculeMode, QueryMode, ReactionMode};
use super::regroup::{regroup, ComponentArena, FinalMolecule, GroupSource};
use super::scanner::Scanner;
use super::splitter::split_groups;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Accept ring closures whose two ends carry opposite `/` `\` bonds.
    pub ignore_closing_bond_direction_mismatch: bool,
    /// Return a [`ReactionHighlighting`] alongside the reaction.
    pub highlighting: bool,
}

/// A loaded reaction and, if requested, its highlighting overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReaction<A, B> {
    pub reaction: Reaction<A, B>,
    /// `Some` iff [`LoaderOptions::highlighting`] was set. Views stay empty
    /// unless the annotation block had an `ha` or `hb` directive.
    pub highlighting: Option<ReactionHighlighting>,
}

/// Loads `reactants>agents>products |annotations|` text.
///
/// The loader holds configuration only; every call starts from scratch.
#[derive(Debug, Clone, Default)]
pub struct ReactionSmilesLoader {
    options: LoaderOptions,
}

impl ReactionSmilesLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Groups are read as SMILES.
    pub fn load_reaction(&self, text: &str) -> Result<ParsedReaction<Atom, Bond>, ReactionSmilesError> {
        self.load::<MoleculeMode>(text)
    }

    /// Groups are read as SMARTS.
    pub fn load_query_reaction(
        &self,
        text: &str,
    ) -> Result<ParsedReaction<AtomExpr, BondExpr>, ReactionSmilesError> {
        self.load::<QueryMode>(text)
    }

    fn load<M: ReactionMode>(
        &self,
        text: &str,
    ) -> Result<ParsedReaction<M::Atom, M::Bond>, ReactionSmilesError> {
        let ignore = self.options.ignore_closing_bond_direction_mismatch;
        let mut scanner = Scanner::new(text);
        let texts = split_groups(&mut scanner)?;

        let ParsedMolecule {
            mol: reactants,
            atom_map: reactant_aam,
        } = M::parse_group(texts.reactants, Group::Reactant, ignore)?;
        let ParsedMolecule {
            mol: agents,
            atom_map: agent_aam,
        } = M::parse_group(texts.agents, Group::Agent, ignore)?;
        let ParsedMolecule {
            mol: products,
            atom_map: product_aam,
        } = M::parse_group(texts.products, Group::Product, ignore)?;

        let molecules = [reactants, agents, products];
        let aams = [reactant_aam, agent_aam, product_aam];

        let arenas = Group::ALL.map(|group| {
            ComponentArena::new(group, decompose(&molecules[group.index()]))
        });
        let atoms = GroupSizes::new(
            IndexSpace::Atom,
            molecules[0].atom_count(),
            molecules[1].atom_count(),
            molecules[2].atom_count(),
        );
        let bonds = GroupSizes::new(
            IndexSpace::Bond,
            molecules[0].bond_count(),
            molecules[1].bond_count(),
            molecules[2].bond_count(),
        );
        let components = GroupSizes::new(
            IndexSpace::Component,
            arenas[0].len(),
            arenas[1].len(),
            arenas[2].len(),
        );
        debug!(
            reactant_components = arenas[0].len(),
            agent_components = arenas[1].len(),
            product_components = arenas[2].len(),
            annotations = texts.has_annotations,
            "parsed reaction groups"
        );

        let mut state = AnnotationState {
            molecules,
            atoms,
            components,
            arenas,
            highlights: HighlightFlags::new(atoms.total(), bonds.total()),
            highlighting_requested: false,
        };
        if texts.has_annotations {
            let directives = parse_annotation_block(&mut scanner, atoms.total())?;
            state.apply_all(&directives)?;
        }
        for group in Group::ALL {
            M::validate_group(&state.molecules[group.index()], group)?;
        }

        let flags = (self.options.highlighting && state.highlighting_requested)
            .then_some(&state.highlights);
        let mut reaction = Reaction::new();
        let mut views = Vec::new();
        for group in Group::ALL {
            let source = GroupSource {
                mol: &state.molecules[group.index()],
                aam: &aams[group.index()],
                atom_offset: atoms.offset(group),
                bond_offset: bonds.offset(group),
            };
            for FinalMolecule {
                mol,
                aam,
                highlight,
            } in regroup(&source, &state.arenas[group.index()], flags)?
            {
                let handle = reaction.add(group, mol);
                *reaction.aam_mut(handle) = aam;
                if let Some(view) = highlight {
                    views.push((handle, view));
                }
            }
        }

        let highlighting = self.options.highlighting.then(|| {
            let mut highlighting = ReactionHighlighting::init(&reaction);
            for (handle, view) in views {
                highlighting.set_view(handle, view);
            }
            highlighting
        });
        debug!(molecules = reaction.len(), "loaded reaction");
        Ok(ParsedReaction {
            reaction,
            highlighting,
        })
    }
}

/// Loads a reaction with default options.
pub fn parse_reaction_smiles(text: &str) -> Result<Reaction<Atom, Bond>, ReactionSmilesError> {
    Ok(ReactionSmilesLoader::default().load_reaction(text)?.reaction)
}

/// Loads a query reaction with default options.
pub fn parse_query_reaction(
    text: &str,
) -> Result<Reaction<AtomExpr, BondExpr>, ReactionSmilesError> {
    Ok(ReactionSmilesLoader::default()
        .load_query_reaction(text)?
        .reaction)
}

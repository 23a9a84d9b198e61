//! Reaction text: `reactants>agents>products`, optionally followed by a
//! `|...|` annotation block carrying stereo groups, radicals, pseudo-atom
//! labels, fragment grouping and highlighting.

pub mod annotation;
pub mod container;
pub mod error;
pub mod group;
pub mod highlight;
mod loader;
pub mod mode;
pub mod regroup;
pub mod scanner;
pub mod splitter;

pub use annotation::{parse_annotation_block, Directive, FragmentMerge};
pub use container::{MoleculeHandle, Reaction};
pub use error::{IndexSpace, ReactionSmilesError};
pub use group::{GlobalIndex, Group, GroupSizes};
pub use highlight::{GraphHighlighting, ReactionHighlighting};
pub use loader::{
    parse_query_reaction, parse_reaction_smiles, LoaderOptions, ParsedReaction,
    ReactionSmilesLoader,
};
pub use mode::{MoleculeMode, QueryMode, ReactionMode};

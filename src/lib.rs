pub mod atom;
pub mod bond;
pub mod element;
pub mod graph_ops;
pub mod mol;
pub mod reaction;
pub mod smarts;
pub mod smiles;
pub mod stereo;
pub mod traits;

pub use atom::{Atom, Chirality, Radical};
pub use bond::{Bond, BondDirection, BondOrder};
pub use element::Element;
pub use graph_ops::{connected_components, decompose, Component, Decomposition};
pub use mol::{Mol, ParsedMolecule};
pub use reaction::{
    parse_query_reaction, parse_reaction_smiles, GraphHighlighting, Group, LoaderOptions,
    MoleculeHandle, ParsedReaction, Reaction, ReactionHighlighting, ReactionSmilesError,
    ReactionSmilesLoader,
};
pub use smarts::{parse_smarts, AtomExpr, BondExpr, SmartsError, SmartsOptions};
pub use smiles::{parse_smiles, SmilesError, SmilesOptions};
pub use stereo::{Stereocenter, StereocenterKind, Stereocenters};
pub use traits::{HasPseudoAtomMut, HasRadicalMut};

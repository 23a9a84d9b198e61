use std::fmt;

use thiserror::Error;

use crate::smarts::SmartsError;
use crate::smiles::SmilesError;

use super::group::Group;

/// Which flat index space an out-of-range index was read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexSpace {
    Atom,
    Bond,
    Component,
}

impl fmt::Display for IndexSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Atom => "atom",
            Self::Bond => "bond",
            Self::Component => "component",
        })
    }
}

/// Error returned when loading a reaction from text.
///
/// Every variant aborts the whole parse; no partial reaction is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactionSmilesError {
    /// Input ended while `context` was still being read.
    #[error("unexpected end of input while reading {context}")]
    UnexpectedEnd { context: &'static str },
    /// A directive did not have the shape its letter requires.
    #[error("malformed '{directive}' directive at position {pos}: expected {expected}, found {}", found_text(.found))]
    MalformedDirective {
        directive: char,
        pos: usize,
        expected: &'static str,
        found: Option<char>,
    },
    /// A directive number did not fit the integer it is read into.
    #[error("number at position {pos} in '{directive}' directive is too large")]
    NumberTooLarge { directive: char, pos: usize },
    /// A `^` directive used a radical code other than 1, 3 or 4.
    #[error("unsupported radical code {code} at position {pos}")]
    UnsupportedRadical { code: u32, pos: usize },
    /// A global index was past the end of its index space.
    #[error("{space} index {index} out of range (bound {bound})")]
    OutOfRange {
        space: IndexSpace,
        index: usize,
        bound: usize,
    },
    /// The pseudo-atom block closed before every atom had a label slot.
    #[error("pseudo-atom block has {found} labels, expected {expected}")]
    CountMismatch { expected: usize, found: usize },
    /// A component bond had no counterpart in its group molecule.
    #[error("no {group} bond between atoms {begin} and {end}")]
    InternalEdgeLookupFailure {
        group: Group,
        begin: usize,
        end: usize,
    },
    /// A character that starts no known directive.
    #[error("unknown directive '{ch}' at position {pos}")]
    UnknownDirective { ch: char, pos: usize },
    /// A merge would forward through more than one level.
    #[error("{group} component {leaf} cannot be merged into {lead}: chained merge")]
    ChainedMerge {
        group: Group,
        lead: usize,
        leaf: usize,
    },
    #[error("invalid {group} SMILES")]
    Smiles {
        group: Group,
        #[source]
        source: SmilesError,
    },
    #[error("invalid {group} SMARTS")]
    Smarts {
        group: Group,
        #[source]
        source: SmartsError,
    },
    #[error("invalid {group} query atom")]
    InvalidQueryAtom {
        group: Group,
        #[source]
        source: SmartsError,
    },
}

fn found_text(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("'{c}'"),
        None => "end of input".to_owned(),
    }
}

impl ReactionSmilesError {
    pub(crate) fn out_of_range(space: IndexSpace, index: usize, bound: usize) -> Self {
        Self::OutOfRange {
            space,
            index,
            bound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn malformed_directive_message() {
        let e = ReactionSmilesError::MalformedDirective {
            directive: 'o',
            pos: 4,
            expected: "':'",
            found: Some('x'),
        };
        assert_eq!(
            e.to_string(),
            "malformed 'o' directive at position 4: expected ':', found 'x'"
        );
        let e = ReactionSmilesError::MalformedDirective {
            directive: 'f',
            pos: 9,
            expected: "index",
            found: None,
        };
        assert!(e.to_string().ends_with("found end of input"));
    }

    #[test]
    fn parser_errors_are_chained() {
        let e = ReactionSmilesError::Smiles {
            group: Group::Product,
            source: SmilesError::EmptyInput,
        };
        assert_eq!(e.to_string(), "invalid product SMILES");
        assert_eq!(e.source().unwrap().to_string(), "empty SMILES string");
    }

    #[test]
    fn out_of_range_message() {
        let e = ReactionSmilesError::out_of_range(IndexSpace::Component, 7, 3);
        assert_eq!(e.to_string(), "component index 7 out of range (bound 3)");
    }
}

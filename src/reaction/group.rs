use std::fmt;

use super::error::{IndexSpace, ReactionSmilesError};

/// One of the three molecule groups of a reaction, in text order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Group {
    Reactant,
    Agent,
    Product,
}

impl Group {
    pub const ALL: [Group; 3] = [Group::Reactant, Group::Agent, Group::Product];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Group::Reactant => "reactant",
            Group::Agent => "agent",
            Group::Product => "product",
        })
    }
}

/// Index into the concatenation of all three groups' sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalIndex(pub usize);

/// Per-group sizes of one flat index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSizes {
    sizes: [usize; 3],
    space: IndexSpace,
}

impl GroupSizes {
    pub fn new(space: IndexSpace, reactants: usize, agents: usize, products: usize) -> Self {
        Self {
            sizes: [reactants, agents, products],
            space,
        }
    }

    pub fn get(&self, group: Group) -> usize {
        self.sizes[group.index()]
    }

    pub fn total(&self) -> usize {
        self.sizes.iter().sum()
    }

    /// Number of entries in all groups before `group`.
    pub fn offset(&self, group: Group) -> usize {
        self.sizes[..group.index()].iter().sum()
    }

    fn out_of_range(&self, index: usize) -> ReactionSmilesError {
        ReactionSmilesError::out_of_range(self.space, index, self.total())
    }

    /// Maps a global index to its group and the index within that group.
    pub fn resolve(&self, idx: GlobalIndex) -> Result<(Group, usize), ReactionSmilesError> {
        let mut local = idx.0;
        for group in Group::ALL {
            let size = self.get(group);
            if local < size {
                return Ok((group, local));
            }
            local -= size;
        }
        Err(self.out_of_range(idx.0))
    }

    /// Resolves `lead` and reduces `other` by the same running totals, so
    /// both are local to the group containing `lead`.
    ///
    /// Fails if `other` does not fall inside that same group.
    pub fn resolve_pair(
        &self,
        lead: GlobalIndex,
        other: GlobalIndex,
    ) -> Result<(Group, usize, usize), ReactionSmilesError> {
        let (group, local_lead) = self.resolve(lead)?;
        let offset = self.offset(group);
        match other.0.checked_sub(offset) {
            Some(local_other) if local_other < self.get(group) => {
                Ok((group, local_lead, local_other))
            }
            _ => Err(self.out_of_range(other.0)),
        }
    }
}

use super::error::ReactionSmilesError;
use super::group::Group;
use super::scanner::Scanner;

/// Raw text of the three groups, before any molecule parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupTexts<'a> {
    pub reactants: &'a str,
    pub agents: &'a str,
    pub products: &'a str,
    /// The products ended at `|`, so an annotation block follows.
    pub has_annotations: bool,
}

impl<'a> GroupTexts<'a> {
    pub fn get(&self, group: Group) -> &'a str {
        match group {
            Group::Reactant => self.reactants,
            Group::Agent => self.agents,
            Group::Product => self.products,
        }
    }
}

/// Reads `reactants>agents>products` and stops after the `|` that opens
/// an annotation block, if any. No escaping is recognised.
pub fn split_groups<'a>(scanner: &mut Scanner<'a>) -> Result<GroupTexts<'a>, ReactionSmilesError> {
    let (reactants, stop) = scanner.take_until(&['>']);
    if stop.is_none() {
        return Err(ReactionSmilesError::UnexpectedEnd {
            context: "reactants",
        });
    }
    let (agents, stop) = scanner.take_until(&['>']);
    if stop.is_none() {
        return Err(ReactionSmilesError::UnexpectedEnd { context: "agents" });
    }
    let (products, stop) = scanner.take_until(&['|']);
    Ok(GroupTexts {
        reactants,
        agents,
        products,
        has_annotations: stop.is_some(),
    })
}

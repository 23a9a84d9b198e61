use std::collections::BTreeMap;

use petgraph::graph::NodeIndex;

/// How the configuration of a stereocenter is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StereocenterKind {
    /// Configuration unknown or either (`w`).
    Any,
    /// Configuration is exactly as drawn (`a`).
    Absolute,
    /// One of drawn or inverted, correlated within an OR group (`o<n>`).
    Or,
    /// Mixture of drawn and inverted, correlated within an AND group (`&<n>`).
    And,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stereocenter {
    pub kind: StereocenterKind,
    /// Enhanced-stereo group number. Always `0` for `Any` and `Absolute`.
    pub group: u32,
}

impl Stereocenter {
    pub fn new(kind: StereocenterKind, group: u32) -> Self {
        Self { kind, group }
    }
}

/// Stereocenter set owned by a molecule, keyed by atom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stereocenters {
    centers: BTreeMap<NodeIndex, Stereocenter>,
}

impl Stereocenters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a stereocenter on `atom`, replacing any existing one.
    pub fn add(&mut self, atom: NodeIndex, kind: StereocenterKind, group: u32) {
        self.centers.insert(atom, Stereocenter::new(kind, group));
    }

    /// Changes the type of the stereocenter on `atom`. An atom that is not a
    /// stereocenter yet becomes one.
    pub fn set_kind(&mut self, atom: NodeIndex, kind: StereocenterKind, group: u32) {
        let center = self
            .centers
            .entry(atom)
            .or_insert(Stereocenter::new(StereocenterKind::Absolute, 0));
        center.kind = kind;
        center.group = group;
    }

    pub fn get(&self, atom: NodeIndex) -> Option<&Stereocenter> {
        self.centers.get(&atom)
    }

    pub fn contains(&self, atom: NodeIndex) -> bool {
        self.centers.contains_key(&atom)
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Stereocenters in ascending atom order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, Stereocenter)> + '_ {
        self.centers.iter().map(|(&atom, &center)| (atom, center))
    }

    /// Re-keys the set through `map`; atoms mapped to `None` are dropped.
    pub fn remap(&self, map: impl Fn(NodeIndex) -> Option<NodeIndex>) -> Stereocenters {
        Stereocenters {
            centers: self
                .centers
                .iter()
                .filter_map(|(&atom, &center)| map(atom).map(|new| (new, center)))
                .collect(),
        }
    }

    pub(crate) fn extend(&mut self, other: Stereocenters) {
        self.centers.extend(other.centers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn add_replaces_existing() {
        let mut sc = Stereocenters::new();
        sc.add(n(1), StereocenterKind::Or, 2);
        sc.add(n(1), StereocenterKind::Any, 0);
        assert_eq!(sc.len(), 1);
        assert_eq!(sc.get(n(1)).unwrap().kind, StereocenterKind::Any);
    }

    #[test]
    fn set_kind_inserts_missing_center() {
        let mut sc = Stereocenters::new();
        sc.set_kind(n(4), StereocenterKind::And, 3);
        let center = sc.get(n(4)).unwrap();
        assert_eq!(center.kind, StereocenterKind::And);
        assert_eq!(center.group, 3);
    }

    #[test]
    fn remap_drops_unmapped_atoms() {
        let mut sc = Stereocenters::new();
        sc.add(n(0), StereocenterKind::Absolute, 0);
        sc.add(n(2), StereocenterKind::Or, 1);
        let remapped = sc.remap(|a| (a.index() == 2).then(|| n(0)));
        assert_eq!(remapped.len(), 1);
        assert_eq!(remapped.get(n(0)).unwrap().kind, StereocenterKind::Or);
    }
}

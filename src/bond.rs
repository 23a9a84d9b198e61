#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

/// Directional single bond marker (`/` is `Up`, `\` is `Down`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondDirection {
    #[default]
    None,
    Up,
    Down,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bond {
    pub order: BondOrder,
    pub direction: BondDirection,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            direction: BondDirection::None,
        }
    }
}

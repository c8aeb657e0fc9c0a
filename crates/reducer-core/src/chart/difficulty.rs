use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Difficulty {
    Easy = 0,
    Medium = 1,
    Hard = 2,
    Expert = 3,
}

impl Difficulty {
    /// Tiers derived from Expert, in the order they are generated.
    pub const DERIVED: [Difficulty; 3] = [Self::Hard, Self::Medium, Self::Easy];

    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn is_derived(&self) -> bool {
        !matches!(self, Self::Expert)
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

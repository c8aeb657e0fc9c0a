use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Playable instrument a note sequence belongs to.
///
/// Track names and text section codes are not fixed here; they live in
/// [`RuleSet`](crate::config::RuleSet) so alternate naming tables can be tested.
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
pub enum Instrument {
    Guitar,
    Bass,
    Drums,
    Keys,
}

impl Instrument {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

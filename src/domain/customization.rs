use serde::{Deserialize, Serialize};

/// How sweet a drink is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SugarLevel {
    NoSugar,
    LessSugar,
    #[default]
    NormalSugar,
    MoreSugar,
}

/// How much ice goes in a drink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IceLevel {
    NoIce,
    LessIce,
    #[default]
    NormalIce,
    MoreIce,
}

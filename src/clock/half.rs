use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("Invalid half: {0} (expected 1 or 2)")]
pub struct InvalidHalf(pub i64);

/// Which half of the match is being played. Serialized as the number 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum Half {
    #[default]
    First,
    Second,
}

impl Half {
    pub fn number(self) -> u8 {
        match self {
            Half::First => 1,
            Half::Second => 2,
        }
    }

    pub fn from_number(number: i64) -> Result<Self, InvalidHalf> {
        match number {
            1 => Ok(Half::First),
            2 => Ok(Half::Second),
            other => Err(InvalidHalf(other)),
        }
    }
}

impl TryFrom<u8> for Half {
    type Error = InvalidHalf;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Half::from_number(i64::from(value))
    }
}

impl From<Half> for u8 {
    fn from(half: Half) -> Self {
        half.number()
    }
}

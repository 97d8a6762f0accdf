use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical transport vocabulary. The API must send exactly these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Air,
    Sea,
    Rail,
    /// Automobile convoys.
    Road,
}

impl Transport {
    pub const ALL: [Transport; 4] = [Transport::Air, Transport::Sea, Transport::Rail, Transport::Road];

    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Air => "air",
            Transport::Sea => "sea",
            Transport::Rail => "rail",
            Transport::Road => "road",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Transport::Air => "Авиация",
            Transport::Sea => "Морской",
            Transport::Rail => "Ж/д",
            Transport::Road => "Автомобиль",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transport '{0}'")]
pub struct UnknownTransport(pub String);

impl FromStr for Transport {
    type Err = UnknownTransport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = crate::filter::normalize(s);
        Transport::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownTransport(s.to_string()))
    }
}

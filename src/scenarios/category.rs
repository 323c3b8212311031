use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HarnessError;

/// Descriptive tag used to select which scenarios run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Smoke,
    Regression,
    Critical,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Smoke, Category::Regression, Category::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Smoke => "smoke",
            Category::Regression => "regression",
            Category::Critical => "critical",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Smoke => "mark test as smoke test",
            Category::Regression => "mark test as regression test",
            Category::Critical => "mark test as critical functionality",
        }
    }

    /// Parse a list of tag names, rejecting any that are not registered.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Category>, HarnessError> {
        names.iter().map(|n| n.as_ref().parse()).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| HarnessError::UnknownCategory(s.trim().to_string()))
    }
}

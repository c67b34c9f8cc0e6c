use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TmsError;

/// Role carried by every user and every issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Manager,
    TestAnalyst,
    Tester,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Manager, Role::TestAnalyst, Role::Tester];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Manager => "manager",
            Role::TestAnalyst => "test-analyst",
            Role::Tester => "tester",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| TmsError::Validation(format!("unknown role: {s}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::Role;

    #[test]
    fn parses_wire_names() {
        assert_eq!("manager".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!("test-analyst".parse::<Role>().unwrap(), Role::TestAnalyst);
        assert_eq!("tester".parse::<Role>().unwrap(), Role::Tester);
        assert!("Manager".parse::<Role>().is_err());
    }

    #[test]
    fn serde_matches_as_str() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }
}

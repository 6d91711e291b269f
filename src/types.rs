use std::fmt;

use serde::{Deserialize, Serialize};

// NOTE: Unit ids are derived from file names (suffix stripped) and are the only join key
// between schema files and resolver test files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UnitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_id_serializes_as_plain_string() {
        let id = UnitId::from("contact");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"contact\"");
        let back: UnitId = serde_json::from_str("\"contact\"").unwrap();
        assert_eq!(back, id);
    }
}

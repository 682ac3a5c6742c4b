//! Sequential numeric entity IDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A numeric entity ID assigned by the store.
///
/// Zero is never assigned and is treated as "missing" by validation.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Create a new EntityId from a raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Whether this ID was never assigned.
    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }

    /// The ID following this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Type alias for better IDs
pub type BetterId = EntityId;

/// Type alias for competition IDs
pub type CompetitionId = EntityId;

/// Type alias for competitor IDs
pub type CompetitorId = EntityId;

/// Type alias for bet IDs
pub type BetId = EntityId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_serializes_as_number() {
        let id = EntityId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let parsed: EntityId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_entity_id_unset() {
        assert!(EntityId::default().is_unset());
        assert!(!EntityId::new(1).is_unset());
    }

    #[test]
    fn test_entity_id_next() {
        assert_eq!(EntityId::new(7).next(), EntityId::new(8));
    }

    #[test]
    fn test_entity_id_display() {
        assert_eq!(format!("{}", EntityId::new(12)), "12");
    }

    #[test]
    fn test_entity_id_debug() {
        let debug_str = format!("{:?}", EntityId::new(3));
        assert!(debug_str.contains('3'));
    }

    #[test]
    fn test_entity_id_from_str() {
        assert_eq!(" 15 ".parse::<EntityId>().unwrap(), EntityId::new(15));
        assert!("abc".parse::<EntityId>().is_err());
    }

    #[test]
    fn test_entity_id_ordering() {
        assert!(EntityId::new(1) < EntityId::new(2));
    }
}

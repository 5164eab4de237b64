//! Error types for the rules engine.

use crate::loadout::LoadoutKind;

/// Recoverable failures reported by engine operations.
///
/// None of these are fatal: the sheet is always left exactly as it was
/// before the failing call, so callers may surface the message and carry on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// Equipping another weapon would exceed the loadout limit.
    #[error("weapon limit reached: at most {limit} weapons can be equipped")]
    WeaponLimitReached {
        /// The configured maximum number of equipped weapons.
        limit: usize,
    },

    /// An index did not point at an existing entry (usually a stale UI index).
    #[error("no {list} entry at index {index}")]
    NoSuchItem {
        /// Which list was indexed.
        list: ListName,
        /// The offending index.
        index: usize,
    },
}

/// The sheet lists that operations index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListName {
    /// The unequipped inventory.
    Inventory,
    /// The equipped weapons.
    Weapons,
    /// The equipped armors.
    Armors,
    /// The ability list.
    Abilities,
}

impl From<LoadoutKind> for ListName {
    fn from(kind: LoadoutKind) -> Self {
        match kind {
            LoadoutKind::Weapon => Self::Weapons,
            LoadoutKind::Armor => Self::Armors,
        }
    }
}

impl std::fmt::Display for ListName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inventory => write!(f, "inventory"),
            Self::Weapons => write!(f, "weapon"),
            Self::Armors => write!(f, "armor"),
            Self::Abilities => write!(f, "ability"),
        }
    }
}

/// Convenience result type for rules operations.
pub type RulesResult<T> = Result<T, RulesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            RulesError::WeaponLimitReached { limit: 2 }.to_string(),
            "weapon limit reached: at most 2 weapons can be equipped"
        );
        assert_eq!(
            RulesError::NoSuchItem {
                list: ListName::Inventory,
                index: 4
            }
            .to_string(),
            "no inventory entry at index 4"
        );
    }

    #[test]
    fn loadout_kind_maps_to_list() {
        assert_eq!(ListName::from(LoadoutKind::Weapon), ListName::Weapons);
        assert_eq!(ListName::from(LoadoutKind::Armor), ListName::Armors);
    }
}

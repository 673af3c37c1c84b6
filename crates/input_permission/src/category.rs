//! Input permission categories and the bitset used to carry them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InputPermissionError;

/// A class of client input that the server can enable or disable per player
///
/// The declaration order is the canonical order used for configuration
/// output, form fields, dropdowns and command enums.
///
/// # Examples
///
/// ```
/// use input_permission::PermissionCategory;
///
/// let category: PermissionCategory = "Lateral_Movement".parse().unwrap();
/// assert_eq!(category, PermissionCategory::LateralMovement);
/// assert_eq!(category.name(), "lateral_movement");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    /// Camera movement
    Camera,
    /// All player movement
    Movement,
    /// Moving laterally in the world
    LateralMovement,
    /// Sneaking, and flying down
    Sneak,
    /// Jumping, and flying up
    Jump,
    /// Mounting vehicles
    Mount,
    /// Dismounting vehicles
    Dismount,
    /// Moving forward
    MoveForward,
    /// Moving backward
    MoveBackward,
    /// Moving left
    MoveLeft,
    /// Moving right
    MoveRight,
}

impl PermissionCategory {
    /// Every category in canonical order
    pub const ALL: [PermissionCategory; 11] = [
        PermissionCategory::Camera,
        PermissionCategory::Movement,
        PermissionCategory::LateralMovement,
        PermissionCategory::Sneak,
        PermissionCategory::Jump,
        PermissionCategory::Mount,
        PermissionCategory::Dismount,
        PermissionCategory::MoveForward,
        PermissionCategory::MoveBackward,
        PermissionCategory::MoveLeft,
        PermissionCategory::MoveRight,
    ];

    /// Name used in configuration keys, command arguments and permission strings
    pub fn name(self) -> &'static str {
        match self {
            PermissionCategory::Camera => "camera",
            PermissionCategory::Movement => "movement",
            PermissionCategory::LateralMovement => "lateral_movement",
            PermissionCategory::Sneak => "sneak",
            PermissionCategory::Jump => "jump",
            PermissionCategory::Mount => "mount",
            PermissionCategory::Dismount => "dismount",
            PermissionCategory::MoveForward => "move_forward",
            PermissionCategory::MoveBackward => "move_backward",
            PermissionCategory::MoveLeft => "move_left",
            PermissionCategory::MoveRight => "move_right",
        }
    }

    /// Human readable label shown in forms
    pub fn label(self) -> &'static str {
        match self {
            PermissionCategory::Camera => "Camera",
            PermissionCategory::Movement => "Movement",
            PermissionCategory::LateralMovement => "Lateral Movement",
            PermissionCategory::Sneak => "Sneak",
            PermissionCategory::Jump => "Jump",
            PermissionCategory::Mount => "Mount",
            PermissionCategory::Dismount => "Dismount",
            PermissionCategory::MoveForward => "Move Forward",
            PermissionCategory::MoveBackward => "Move Backward",
            PermissionCategory::MoveLeft => "Move Left",
            PermissionCategory::MoveRight => "Move Right",
        }
    }

    /// Long description, used as the tooltip of the configuration form field
    pub fn description(self) -> &'static str {
        match self {
            PermissionCategory::Camera => "Player input relating to camera movement.",
            PermissionCategory::Movement => {
                "Player input relating to all player movement. Disabling this is equivalent to disabling jump, sneak, lateral movement, mount, and dismount."
            }
            PermissionCategory::LateralMovement => {
                "Player input for moving laterally in the world. This would be WASD on a keyboard or the movement joystick on gamepad or touch."
            }
            PermissionCategory::Sneak => {
                "Player input relating to sneak. This also affects flying down."
            }
            PermissionCategory::Jump => {
                "Player input relating to jumping. This also affects flying up."
            }
            PermissionCategory::Mount => "Player input relating to mounting vehicles.",
            PermissionCategory::Dismount => {
                "Player input relating to dismounting. When disabled, the player can still dismount vehicles by other means, for example on horses players can still jump off and in boats players can go into another boat."
            }
            PermissionCategory::MoveForward => {
                "Player input relating to moving the player forward."
            }
            PermissionCategory::MoveBackward => {
                "Player input relating to moving the player backward."
            }
            PermissionCategory::MoveLeft => "Player input relating to moving the player left.",
            PermissionCategory::MoveRight => "Player input relating to moving the player right.",
        }
    }

    /// Client translation key for the category label
    pub fn translation_key(self) -> String {
        format!("commands.inputpermission.{}", self.name())
    }

    /// Position of the category in [`ALL`](Self::ALL)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Category at the given canonical position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Look up a category by its name, ignoring ASCII case
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PermissionCategory {
    type Err = InputPermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| InputPermissionError::UnknownCategory {
            name: s.to_string(),
        })
    }
}

/// Whether a category is allowed, as written in commands and messages
///
/// # Examples
///
/// ```
/// use input_permission::InputState;
///
/// assert_eq!("Disabled".parse::<InputState>().unwrap(), InputState::Disabled);
/// assert_eq!(InputState::from(true).as_str(), "enabled");
/// assert!("off".parse::<InputState>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputState {
    /// The category is usable
    Enabled,
    /// The category is blocked
    Disabled,
}

impl InputState {
    /// Both states, in command-enum order
    pub const ALL: [InputState; 2] = [InputState::Enabled, InputState::Disabled];

    /// Spelling used in commands and messages
    pub fn as_str(self) -> &'static str {
        match self {
            InputState::Enabled => "enabled",
            InputState::Disabled => "disabled",
        }
    }

    /// Whether this is [`InputState::Enabled`]
    pub fn is_enabled(self) -> bool {
        self == InputState::Enabled
    }
}

impl From<bool> for InputState {
    fn from(enabled: bool) -> Self {
        if enabled {
            InputState::Enabled
        } else {
            InputState::Disabled
        }
    }
}

impl fmt::Display for InputState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputState {
    type Err = InputPermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enabled" => Ok(InputState::Enabled),
            "disabled" => Ok(InputState::Disabled),
            _ => Err(InputPermissionError::InvalidState {
                value: s.to_string(),
            }),
        }
    }
}

/// Set of categories packed into one bit each
///
/// # Examples
///
/// ```
/// use input_permission::{CategorySet, PermissionCategory};
///
/// let mut set = CategorySet::empty();
/// set.insert(PermissionCategory::Jump);
/// assert!(set.contains(PermissionCategory::Jump));
/// assert!(!set.contains(PermissionCategory::Camera));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CategorySet(u16);

impl CategorySet {
    /// A set with no categories
    pub const fn empty() -> Self {
        Self(0)
    }

    /// A set with every category
    pub fn all() -> Self {
        PermissionCategory::ALL.into_iter().collect()
    }

    fn bit(category: PermissionCategory) -> u16 {
        1 << category.index()
    }

    /// Whether the category is in the set
    pub fn contains(self, category: PermissionCategory) -> bool {
        self.0 & Self::bit(category) != 0
    }

    /// Add a category
    pub fn insert(&mut self, category: PermissionCategory) {
        self.0 |= Self::bit(category);
    }

    /// Remove a category
    pub fn remove(&mut self, category: PermissionCategory) {
        self.0 &= !Self::bit(category);
    }

    /// Add or remove a category
    pub fn set(&mut self, category: PermissionCategory, present: bool) {
        if present {
            self.insert(category);
        } else {
            self.remove(category);
        }
    }

    /// Number of categories in the set
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set has no categories
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Categories in the set, in canonical order
    pub fn iter(self) -> impl Iterator<Item = PermissionCategory> {
        PermissionCategory::ALL
            .into_iter()
            .filter(move |category| self.contains(*category))
    }
}

impl FromIterator<PermissionCategory> for CategorySet {
    fn from_iter<I: IntoIterator<Item = PermissionCategory>>(iter: I) -> Self {
        let mut set = CategorySet::empty();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_in_declaration_order() {
        for (i, category) in PermissionCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
            assert_eq!(PermissionCategory::from_index(i), Some(*category));
        }
        assert_eq!(PermissionCategory::from_index(11), None);
    }

    #[test]
    fn test_names_round_trip_through_from_str() {
        for category in PermissionCategory::ALL {
            assert_eq!(category.name().parse::<PermissionCategory>().unwrap(), category);
        }
    }

    #[test]
    fn test_from_name_ignores_case() {
        assert_eq!(
            PermissionCategory::from_name("MOVE_LEFT"),
            Some(PermissionCategory::MoveLeft)
        );
        assert_eq!(PermissionCategory::from_name("move left"), None);
    }

    #[test]
    fn test_unknown_name_is_error() {
        let err = "fly".parse::<PermissionCategory>().unwrap_err();
        assert!(matches!(err, InputPermissionError::UnknownCategory { name } if name == "fly"));
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&PermissionCategory::MoveBackward).unwrap();
        assert_eq!(json, r#""move_backward""#);
    }

    #[test]
    fn test_translation_key() {
        assert_eq!(
            PermissionCategory::Sneak.translation_key(),
            "commands.inputpermission.sneak"
        );
    }

    #[test]
    fn test_input_state_parsing() {
        assert_eq!("ENABLED".parse::<InputState>().unwrap(), InputState::Enabled);
        assert!(InputState::Enabled.is_enabled());
        assert!(!InputState::from(false).is_enabled());
        let err = "on".parse::<InputState>().unwrap_err();
        assert!(matches!(err, InputPermissionError::InvalidState { value } if value == "on"));
    }

    #[test]
    fn test_category_set_operations() {
        let mut set = CategorySet::empty();
        assert!(set.is_empty());

        set.insert(PermissionCategory::Sneak);
        set.insert(PermissionCategory::Jump);
        set.set(PermissionCategory::Camera, true);
        set.set(PermissionCategory::Camera, false);

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![PermissionCategory::Sneak, PermissionCategory::Jump]
        );

        set.remove(PermissionCategory::Sneak);
        assert!(!set.contains(PermissionCategory::Sneak));
        assert_eq!(CategorySet::all().len(), 11);
    }
}

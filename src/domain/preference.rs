use serde_json::Value;

/// A user's stored choice for one source. Absence of a stored value is `Unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriState {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl TriState {
    const ENABLED: u8 = 1;
    const DISABLED: u8 = 0;

    /// Decode a persisted `0|1`. Anything else is not a valid choice.
    pub fn from_stored(value: &Value) -> Option<Self> {
        match value.as_u64() {
            Some(v) if v == u64::from(Self::ENABLED) => Some(TriState::Enabled),
            Some(v) if v == u64::from(Self::DISABLED) => Some(TriState::Disabled),
            _ => None,
        }
    }

    /// The persisted form, `None` for `Unset`.
    pub fn stored_value(self) -> Option<u8> {
        match self {
            TriState::Unset => None,
            TriState::Enabled => Some(Self::ENABLED),
            TriState::Disabled => Some(Self::DISABLED),
        }
    }

    /// Resolve against the catalog default.
    pub fn resolve(self, enabled_by_default: bool) -> bool {
        effective_enabled(
            self == TriState::Enabled,
            enabled_by_default,
            self == TriState::Disabled,
        )
    }
}

/// `user_enabled || (default_enabled && !user_disabled)`
pub fn effective_enabled(user_enabled: bool, default_enabled: bool, user_disabled: bool) -> bool {
    user_enabled || (default_enabled && !user_disabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_enabled_truth_table() {
        // (user_enabled, default_enabled, user_disabled) -> expected
        let cases = [
            ((false, false, false), false),
            ((false, false, true), false),
            ((false, true, false), true),
            ((false, true, true), false),
            ((true, false, false), true),
            ((true, false, true), true),
            ((true, true, false), true),
            ((true, true, true), true),
        ];
        for ((enabled, default, disabled), expected) in cases {
            assert_eq!(
                effective_enabled(enabled, default, disabled),
                expected,
                "enabled={enabled} default={default} disabled={disabled}"
            );
        }
    }

    #[test]
    fn test_resolve() {
        assert!(TriState::Unset.resolve(true));
        assert!(!TriState::Unset.resolve(false));
        assert!(TriState::Enabled.resolve(false));
        assert!(!TriState::Disabled.resolve(true));
    }

    #[test]
    fn test_stored_values() {
        assert_eq!(TriState::from_stored(&json!(1)), Some(TriState::Enabled));
        assert_eq!(TriState::from_stored(&json!(0)), Some(TriState::Disabled));
        assert_eq!(TriState::from_stored(&json!(2)), None);
        assert_eq!(TriState::from_stored(&json!("1")), None);
        assert_eq!(TriState::Enabled.stored_value(), Some(1));
        assert_eq!(TriState::Disabled.stored_value(), Some(0));
        assert_eq!(TriState::Unset.stored_value(), None);
    }
}

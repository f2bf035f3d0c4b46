/// Engine mutation selected by a single key press.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    Hold,
}

/// Key bindings, keyed by `KeyboardEvent.code`. Several identifiers may alias
/// to the same action; a single identifier never selects more than one.
const KEY_BINDINGS: &[(&str, Action)] = &[
    ("ArrowLeft", Action::MoveLeft),
    ("ArrowRight", Action::MoveRight),
    ("ArrowUp", Action::Rotate),
    ("KeyX", Action::Rotate),
    ("ArrowDown", Action::SoftDrop),
    ("Space", Action::HardDrop),
    ("KeyC", Action::Hold),
];

/// Looks up the action bound to a key identifier. Unbound keys are not an
/// error; they select nothing.
pub fn action_for_key(code: &str) -> Option<Action> {
    KEY_BINDINGS
        .iter()
        .find(|(key, _)| *key == code)
        .map(|&(_, action)| action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_left_selects_move_left() {
        assert_eq!(action_for_key("ArrowLeft"), Some(Action::MoveLeft));
    }

    #[test]
    fn unbound_key_selects_nothing() {
        assert_eq!(action_for_key("KeyQ"), None);
        assert_eq!(action_for_key(""), None);
    }

    #[test]
    fn rotate_has_arrow_and_letter_aliases() {
        assert_eq!(action_for_key("ArrowUp"), Some(Action::Rotate));
        assert_eq!(action_for_key("KeyX"), Some(Action::Rotate));
    }

    #[test]
    fn hold_and_soft_drop_are_distinct_bindings() {
        assert_eq!(action_for_key("KeyC"), Some(Action::Hold));
        assert_eq!(action_for_key("ArrowDown"), Some(Action::SoftDrop));
    }

    #[test]
    fn each_identifier_appears_exactly_once() {
        for (index, (key, _)) in KEY_BINDINGS.iter().enumerate() {
            let duplicates = KEY_BINDINGS
                .iter()
                .enumerate()
                .filter(|(other, (other_key, _))| *other != index && other_key == key)
                .count();
            assert_eq!(duplicates, 0, "duplicate binding for {key}");
        }
    }
}

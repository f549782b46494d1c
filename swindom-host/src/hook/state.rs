//! Hook subscription state machine
//!
//! Pure: given the current state and the category the plugin now asks for,
//! say what the next state is and which hook operation gets there.

use swindom_plugin_api::WindowEventType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookState {
    #[default]
    Unhooked,
    Hooked(WindowEventType),
}

/// Hook operation needed to reach the next state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    Nothing,
    /// Create a subscription, attach the dispatch callback, hook the category
    Subscribe(WindowEventType),
    /// Unhook `from` and hook `to` on the existing subscription
    Retarget {
        from: WindowEventType,
        to: WindowEventType,
    },
    /// Unhook `from` and release the subscription
    Release { from: WindowEventType },
}

pub fn transition(state: HookState, requested: WindowEventType) -> (HookState, HookAction) {
    match (state, requested.is_none()) {
        (HookState::Unhooked, true) => (HookState::Unhooked, HookAction::Nothing),
        (HookState::Unhooked, false) => (
            HookState::Hooked(requested),
            HookAction::Subscribe(requested),
        ),
        (HookState::Hooked(from), true) => (HookState::Unhooked, HookAction::Release { from }),
        (HookState::Hooked(current), false) if current == requested => {
            (state, HookAction::Nothing)
        }
        (HookState::Hooked(from), false) => (
            HookState::Hooked(requested),
            HookAction::Retarget {
                from,
                to: requested,
            },
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FG: WindowEventType = WindowEventType::FOREGROUND;
    const SHOW: WindowEventType = WindowEventType::SHOW;

    #[test]
    fn unhooked_stays_unhooked_on_none() {
        assert_eq!(
            transition(HookState::Unhooked, WindowEventType::NONE),
            (HookState::Unhooked, HookAction::Nothing)
        );
    }

    #[test]
    fn unhooked_subscribes_on_category() {
        assert_eq!(
            transition(HookState::Unhooked, FG),
            (HookState::Hooked(FG), HookAction::Subscribe(FG))
        );
    }

    #[test]
    fn hooked_releases_on_none() {
        assert_eq!(
            transition(HookState::Hooked(FG), WindowEventType::NONE),
            (HookState::Unhooked, HookAction::Release { from: FG })
        );
    }

    #[test]
    fn hooked_retargets_on_new_category() {
        assert_eq!(
            transition(HookState::Hooked(FG), SHOW),
            (
                HookState::Hooked(SHOW),
                HookAction::Retarget { from: FG, to: SHOW }
            )
        );
    }

    #[test]
    fn hooked_same_category_is_noop() {
        assert_eq!(
            transition(HookState::Hooked(FG), FG),
            (HookState::Hooked(FG), HookAction::Nothing)
        );
    }

    #[test]
    fn combined_categories_are_one_target() {
        let both = FG | SHOW;
        assert_eq!(
            transition(HookState::Hooked(FG), both),
            (
                HookState::Hooked(both),
                HookAction::Retarget { from: FG, to: both }
            )
        );
    }
}

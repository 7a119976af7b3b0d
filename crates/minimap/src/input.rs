#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    ToggleOverlay,
    ToggleClock,
    ToggleDoubleSize,
}

const ACTION_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::ToggleOverlay,
        InputAction::ToggleClock,
        InputAction::ToggleDoubleSize,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::ToggleOverlay => 0,
            InputAction::ToggleClock => 1,
            InputAction::ToggleDoubleSize => 2,
        }
    }
}

/// Keys held during one host frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }
}

/// Turns held-key snapshots into press edges.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EdgeDetector {
    previous: ActionStates,
}

impl EdgeDetector {
    pub(crate) fn pressed(&mut self, input: &InputSnapshot) -> Vec<InputAction> {
        let pressed = InputAction::ALL
            .into_iter()
            .filter(|action| input.is_down(*action) && !self.previous.is_down(*action))
            .collect();
        self.previous = input.actions;
        pressed
    }
}

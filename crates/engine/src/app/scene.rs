/// One simulation tick's worth of player input, captured by the frame
/// driver before the scene updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    left_down: bool,
    right_down: bool,
    up_down: bool,
    down_down: bool,
    attack_down: bool,
    cast_down: bool,
    interact_down: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    pub fn with_left_down(mut self, left_down: bool) -> Self {
        self.left_down = left_down;
        self
    }

    pub fn with_right_down(mut self, right_down: bool) -> Self {
        self.right_down = right_down;
        self
    }

    pub fn with_up_down(mut self, up_down: bool) -> Self {
        self.up_down = up_down;
        self
    }

    pub fn with_down_down(mut self, down_down: bool) -> Self {
        self.down_down = down_down;
        self
    }

    pub fn with_attack_down(mut self, attack_down: bool) -> Self {
        self.attack_down = attack_down;
        self
    }

    pub fn with_cast_down(mut self, cast_down: bool) -> Self {
        self.cast_down = cast_down;
        self
    }

    pub fn with_interact_down(mut self, interact_down: bool) -> Self {
        self.interact_down = interact_down;
        self
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn left_down(&self) -> bool {
        self.left_down
    }

    pub fn right_down(&self) -> bool {
        self.right_down
    }

    pub fn up_down(&self) -> bool {
        self.up_down
    }

    pub fn down_down(&self) -> bool {
        self.down_down
    }

    pub fn attack_down(&self) -> bool {
        self.attack_down
    }

    pub fn cast_down(&self) -> bool {
        self.cast_down
    }

    pub fn interact_down(&self) -> bool {
        self.interact_down
    }
}

/// What the scene asks of the frame driver after a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    None,
    /// Leave for another map, spawning at the given tile.
    SwitchTo {
        map: String,
        start_x: i32,
        start_y: i32,
    },
    Quit,
}

pub trait Scene {
    /// One simulation tick. `now_ms` is monotonic simulation time; the
    /// driver guarantees `delta_ms >= 0`.
    fn update(&mut self, now_ms: f64, delta_ms: f32, input: &InputSnapshot) -> SceneCommand;
}

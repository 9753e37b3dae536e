#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) enum Direction {
    #[default]
    None,
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    const CARDINALS: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    /// Unit vector in world space. Y grows downward.
    fn vector(self) -> Vec2 {
        match self {
            Self::None => Vec2::new(0.0, 0.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Down => Vec2::new(0.0, 1.0),
        }
    }

    fn tile_offset(self) -> (i32, i32) {
        match self {
            Self::None => (0, 0),
            Self::Left => (-1, 0),
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
        }
    }

    fn from_token(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "left" => Some(Self::Left),
            "up" => Some(Self::Up),
            "right" => Some(Self::Right),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

/// Spawn config facing. Unrecognized tokens fall back to DOWN rather than
/// failing setup; this is the one configuration field with a default.
fn facing_from_config(value: Option<&str>) -> Direction {
    value
        .and_then(Direction::from_token)
        .unwrap_or(Direction::Down)
}

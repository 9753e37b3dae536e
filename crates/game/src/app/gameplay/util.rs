#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    fn overlaps(self, other: Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    fn contains(self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Footprint a mover claims at a candidate position: full tile wide, a
/// third of a tile tall, anchored just under the sprite center.
fn mover_bounds(position: Vec2) -> Rect {
    Rect {
        x: position.x - TILE_SIZE / 2.0,
        y: position.y - TILE_SIZE / 3.0,
        width: TILE_SIZE,
        height: TILE_SIZE / 3.0,
    }
}

/// Full sprite bounds of a standing actor.
fn actor_bounds(position: Vec2) -> Rect {
    Rect {
        x: position.x - TILE_SIZE / 2.0,
        y: position.y - TILE_SIZE / 2.0,
        width: TILE_SIZE,
        height: TILE_SIZE,
    }
}

fn has_other_actor_at(self_id: ActorId, others: &[ActorObstacle], position: Vec2) -> bool {
    let footprint = mover_bounds(position);
    others
        .iter()
        .any(|other| other.id != self_id && footprint.overlaps(actor_bounds(other.position)))
}

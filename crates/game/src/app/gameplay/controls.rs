#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CastUpdate {
    Inactive,
    Active,
    Started,
}

impl CastUpdate {
    fn suppresses_movement(self) -> bool {
        matches!(self, Self::Active | Self::Started)
    }
}

/// Player-side control bookkeeping: cast gating. Attack stance gating lives
/// on the actor itself, shared with AI-driven attackers.
#[derive(Debug, Default)]
struct UserControls {
    casting: bool,
    last_cast_start_ms: Option<f64>,
}

impl UserControls {
    fn movement_intent(input: &InputSnapshot) -> Direction {
        if input.left_down() {
            Direction::Left
        } else if input.right_down() {
            Direction::Right
        } else if input.up_down() {
            Direction::Up
        } else if input.down_down() {
            Direction::Down
        } else {
            Direction::None
        }
    }

    /// A cast holds the casting state for `CASTING_PERIOD_MS`; the cooldown
    /// reset arrives later as a scheduled event. Only a fresh request while
    /// idle actually starts a cast.
    fn update_casting(
        &mut self,
        requested: bool,
        now_ms: f64,
        events: &mut ScheduledQueue<GameEvent>,
    ) -> CastUpdate {
        if self.casting {
            if let Some(start) = self.last_cast_start_ms {
                if now_ms - start < CASTING_PERIOD_MS {
                    return CastUpdate::Active;
                }
            }
        }
        if requested && !self.casting {
            self.casting = true;
            self.last_cast_start_ms = Some(now_ms);
            events.schedule(now_ms + CAST_COOLDOWN_MS, GameEvent::CastCooldownExpired);
            info!("cast_started");
            return CastUpdate::Started;
        }
        CastUpdate::Inactive
    }

    fn finish_cast_cooldown(&mut self) {
        self.casting = false;
    }
}

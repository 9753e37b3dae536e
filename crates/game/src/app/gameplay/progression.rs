type SaveLoadResult<T> = Result<T, String>;

/// The flat key-to-number snapshot the save blob holds. Field names are the
/// persistence contract; the blob has no schema version.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PlayerSnapshot {
    ap: i64,
    attack_speed: f64,
    hp: i64,
    max_hp: i64,
    level: u32,
    experience: i64,
    gold: i64,
}

/// Stat accumulation and leveling. Mutators are plain additions; nothing
/// here clamps hp/ap/gold, that is the caller's concern.
#[derive(Debug, Clone)]
pub(crate) struct ProgressionLedger {
    level_settings: Vec<LevelBand>,
    ap: i64,
    attack_period_ms: f64,
    hp: i64,
    max_hp: i64,
    level: u32,
    experience: i64,
    gold: i64,
}

impl ProgressionLedger {
    pub(crate) fn from_script(player: &PlayerScript, level_settings: Vec<LevelBand>) -> Self {
        Self {
            level_settings,
            ap: player.ap,
            attack_period_ms: player.attack_speed,
            hp: player.hp,
            max_hp: player.max_hp,
            level: player.level,
            experience: player.experience,
            gold: player.gold,
        }
    }

    fn ap(&self) -> i64 {
        self.ap
    }

    fn attack_period_ms(&self) -> f64 {
        self.attack_period_ms
    }

    fn hp(&self) -> i64 {
        self.hp
    }

    fn max_hp(&self) -> i64 {
        self.max_hp
    }

    pub(crate) fn level(&self) -> u32 {
        self.level
    }

    pub(crate) fn experience(&self) -> i64 {
        self.experience
    }

    pub(crate) fn gold(&self) -> i64 {
        self.gold
    }

    #[allow(dead_code)]
    fn change_ap(&mut self, by: i64) {
        self.ap += by;
    }

    fn change_hp(&mut self, by: i64) {
        self.hp += by;
    }

    fn change_gold(&mut self, by: i64) {
        self.gold += by;
    }

    /// Accumulates experience and reports whether a level threshold was
    /// crossed. At most one level per call: the band loop breaks after the
    /// first matching band, so a large grant needs repeated calls to cash
    /// in queued levels.
    fn change_experience(&mut self, by: i64) -> bool {
        self.experience += by;
        self.check_level_up()
    }

    fn check_level_up(&mut self) -> bool {
        let mut exp_required: i64 = 0;
        let mut level_step = i64::from(self.level);
        for index in 0..self.level_settings.len() {
            let setting = self.level_settings[index];
            let from = setting.from;
            let to = setting.to.unwrap_or(LEVEL_BAND_OPEN_END);
            if from <= self.level && self.level <= to {
                exp_required += level_step * setting.exp;
                if self.experience >= exp_required {
                    self.level_up(setting);
                    return true;
                }
                break;
            } else {
                let band_levels = i64::from(to - from + 1);
                exp_required += setting.exp * band_levels;
                level_step -= band_levels;
            }
        }
        false
    }

    fn level_up(&mut self, setting: LevelBand) {
        self.level += 1;
        self.ap += setting.ap;
        self.max_hp += setting.hp;
        self.hp = self.max_hp;
        self.attack_period_ms += setting.attack_period as f64;
        info!(level = self.level, "level_up");
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            ap: self.ap,
            attack_speed: self.attack_period_ms,
            hp: self.hp,
            max_hp: self.max_hp,
            level: self.level,
            experience: self.experience,
            gold: self.gold,
        }
    }

    fn apply_snapshot(&mut self, snapshot: PlayerSnapshot) {
        self.ap = snapshot.ap;
        self.attack_period_ms = snapshot.attack_speed;
        self.hp = snapshot.hp;
        self.max_hp = snapshot.max_hp;
        self.level = snapshot.level;
        self.experience = snapshot.experience;
        self.gold = snapshot.gold;
    }

    pub(crate) fn save(&self, store: &SaveStore) -> SaveLoadResult<()> {
        let blob = serde_json::to_string(&self.snapshot())
            .map_err(|error| format!("encode save json: {error}"))?;
        store
            .write_blob(&blob)
            .map_err(|error| error.to_string())?;
        debug!(path = %store.path().display(), "save_written");
        Ok(())
    }

    /// All-or-nothing: the ledger only changes once the whole snapshot has
    /// parsed. A malformed blob leaves every field at its pre-load value.
    pub(crate) fn load_from(&mut self, store: &SaveStore) -> SaveLoadResult<()> {
        let raw = store.read_blob().map_err(|error| error.to_string())?;
        let snapshot = parse_snapshot_json(&raw)?;
        self.apply_snapshot(snapshot);
        Ok(())
    }
}

fn parse_snapshot_json(raw: &str) -> SaveLoadResult<PlayerSnapshot> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, PlayerSnapshot>(&mut deserializer) {
        Ok(snapshot) => Ok(snapshot),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse save json: {source}"))
            } else {
                Err(format!("parse save json at {path}: {source}"))
            }
        }
    }
}

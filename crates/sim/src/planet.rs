use nova_core::Player;
use nova_spec::ShipList;

/// Torpedoes a starbase contributes per tube when planets fire torpedoes.
const PLANETARY_TORPS_PER_TUBE: i32 = 8;

/// One simulated planet, with an optional starbase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planet {
    pub id: i32,
    pub name: String,
    pub friendly_code: String,
    pub owner: Player,
    pub damage: i32,
    pub shield: i32,
    pub experience_level: i32,
    pub flags: u32,
    pub defense: i32,
    pub base_defense: i32,
    pub base_beam_tech: i32,
    pub base_torp_tech: i32,
    pub num_base_fighters: i32,
    /// Starbase torpedo stockpile by launcher type 1..=10.
    pub num_base_torpedoes: [i32; 11],
}

impl Default for Planet {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            friendly_code: "???".to_string(),
            owner: 0,
            damage: 0,
            shield: 100,
            experience_level: 0,
            flags: 0,
            defense: 0,
            base_defense: 0,
            base_beam_tech: 0,
            base_torp_tech: 0,
            num_base_fighters: 0,
            num_base_torpedoes: [0; 11],
        }
    }
}

/// Integer square root, rounded to nearest.
fn isqrt_round(n: i32) -> i32 {
    if n <= 0 {
        return 0;
    }
    let mut r = 0;
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }
    // Round up when the remainder crosses the midpoint.
    if n - r * r > r { r + 1 } else { r }
}

impl Planet {
    pub fn has_base(&self) -> bool {
        self.base_defense > 0 || self.base_beam_tech > 0
    }
    pub fn set_num_base_torpedoes(&mut self, torpedo_type: i32, count: i32) {
        if (1..=10).contains(&torpedo_type) {
            self.num_base_torpedoes[torpedo_type as usize] = count;
        }
    }
    pub fn num_base_torpedoes(&self, torpedo_type: i32) -> i32 {
        if (1..=10).contains(&torpedo_type) {
            self.num_base_torpedoes[torpedo_type as usize]
        } else {
            0
        }
    }

    /// Combat mass: a bare planet weighs 100 kt, defense posts and the
    /// starbase add their own.
    pub fn combat_mass(&self) -> i32 {
        100 + self.defense + self.base_defense
    }
    /// Number of defense beams.
    pub fn combat_beams(&self) -> i32 {
        isqrt_round(self.defense / 3)
    }
    /// Beam type: planetary emplacements improve with defense, the
    /// starbase tech sets a floor.
    pub fn combat_beam_type(&self, list: &ShipList) -> i32 {
        isqrt_round(self.defense / 2)
            .max(self.base_beam_tech)
            .clamp(1, list.num_beams() as i32)
    }
    /// Fighter bays: defense posts plus five for a starbase.
    pub fn combat_bays(&self) -> i32 {
        isqrt_round(self.defense / 5) + if self.has_base() { 5 } else { 0 }
    }
    /// Fighters: planetary fighters plus the starbase complement.
    pub fn combat_fighters(&self) -> i32 {
        isqrt_round(self.defense) + self.num_base_fighters
    }
    /// Torpedo launcher type the base fires, limited by its tech level.
    pub fn combat_torpedo_type(&self, list: &ShipList) -> i32 {
        (1..=list.num_launchers() as i32)
            .filter(|t| list.launcher(*t).map(|l| l.tech <= self.base_torp_tech).unwrap_or(false))
            .max()
            .unwrap_or(0)
    }
    /// Number of torpedo tubes when planets fire torpedoes.
    pub fn combat_launchers(&self) -> i32 {
        if self.has_base() {
            isqrt_round(self.base_defense / 10).min(10)
        } else {
            0
        }
    }
    /// Effective torpedo count: the stockpile converted by money value
    /// into the chosen type, plus the per-tube allowance.
    pub fn combat_torpedoes(&self, list: &ShipList) -> i32 {
        let chosen = self.combat_torpedo_type(list);
        let Some(launcher) = list.launcher(chosen) else {
            return 0;
        };
        let stock_value: i32 = (1..=10)
            .filter_map(|t| {
                list.launcher(t)
                    .map(|l| l.torpedo_cost * self.num_base_torpedoes(t))
            })
            .sum();
        stock_value / launcher.torpedo_cost.max(1)
            + self.combat_launchers() * PLANETARY_TORPS_PER_TUBE
    }
}

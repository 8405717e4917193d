use nova_combat::Algorithm;
use nova_core::NUM_PLAYERS;
use nova_core::Player;

/// Combat algorithm selector as exposed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VcrMode {
    #[default]
    Host,
    NuHost,
    PHost2,
    PHost3,
    PHost4,
    Flak,
}

impl VcrMode {
    pub fn algorithm(self) -> Algorithm {
        match self {
            VcrMode::Host => Algorithm::Host,
            VcrMode::NuHost => Algorithm::NuHost,
            VcrMode::PHost2 => Algorithm::PHost2,
            VcrMode::PHost3 => Algorithm::PHost3,
            VcrMode::PHost4 => Algorithm::PHost4,
            VcrMode::Flak => Algorithm::Flak,
        }
    }
}

/// Series balancing applied when the caller iterates many passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalancingMode {
    #[default]
    BalanceNone,
    /// "360 kt" bonus balancing: doubles the series.
    Balance360k,
    /// "Master at Arms" balancing: bay and fighter bonus passes.
    BalanceMasterAtArms,
}

/// Directed player-to-player bit matrix (alliances, persistent enemies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerMatrix([u16; NUM_PLAYERS + 1]);

impl PlayerMatrix {
    pub fn set(&mut self, from: Player, to: Player, value: bool) {
        if (1..=NUM_PLAYERS as i32).contains(&from) && (1..=NUM_PLAYERS as i32).contains(&to) {
            if value {
                self.0[from as usize] |= 1 << to;
            } else {
                self.0[from as usize] &= !(1 << to);
            }
        }
    }
    pub fn get(&self, from: Player, to: Player) -> bool {
        (1..=NUM_PLAYERS as i32).contains(&from)
            && (1..=NUM_PLAYERS as i32).contains(&to)
            && self.0[from as usize] & (1 << to) != 0
    }
    /// True when both directions are set.
    pub fn is_mutual(&self, a: Player, b: Player) -> bool {
        self.get(a, b) && self.get(b, a)
    }
}

/// Simulation options, one instance per simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub mode: VcrMode,
    /// Engine-shield bonus in percent, 0..=100.
    pub engine_shield_bonus: i32,
    /// +50 kt combat mass for Federation ships.
    pub scotty_bonus: bool,
    /// PHost only: randomize side assignment.
    pub random_left_right: bool,
    pub honor_alliances: bool,
    /// Do not iterate the series; one pass only.
    pub only_one_simulation: bool,
    /// Never advance the caller's generator.
    pub seed_control: bool,
    pub randomize_fcodes_on_every_fight: bool,
    pub balancing_mode: BalancingMode,
    pub alliance_settings: PlayerMatrix,
    pub enemy_settings: PlayerMatrix,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: VcrMode::Host,
            engine_shield_bonus: 0,
            scotty_bonus: true,
            random_left_right: false,
            honor_alliances: true,
            only_one_simulation: false,
            seed_control: false,
            randomize_fcodes_on_every_fight: false,
            balancing_mode: BalancingMode::BalanceNone,
            alliance_settings: PlayerMatrix::default(),
            enemy_settings: PlayerMatrix::default(),
        }
    }
}

impl Options {
    /// Series multiplier of the configured balancing mode over a setup
    /// with the given carrier features.
    pub fn balance_multiplier(&self, any_bays: bool, any_fighters: bool) -> i32 {
        match self.balancing_mode {
            BalancingMode::BalanceNone => 1,
            BalancingMode::Balance360k => 2,
            BalancingMode::BalanceMasterAtArms => {
                (if any_bays { 2 } else { 1 }) * (if any_fighters { 2 } else { 1 })
            }
        }
    }
    /// Total weight of a series under the configured balancing mode.
    pub fn total_battle_weight(&self) -> i32 {
        match self.balancing_mode {
            BalancingMode::BalanceNone => 1,
            BalancingMode::Balance360k => 100,
            BalancingMode::BalanceMasterAtArms => 1000,
        }
    }
}

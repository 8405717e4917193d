use crate::FlakConfig;
use crate::HostConfig;
use crate::Object;
use crate::Statistic;
use crate::Weapons;
use nova_core::Rng;

/// Selector over the supported combat algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Classic Host.
    Host,
    /// Classic Host as shipped by NuHost: longer series, always-known
    /// Klingon double beam charge and cloaked fighter bays.
    NuHost,
    /// PHost version 2.
    PHost2,
    /// PHost version 3: aggressor/opponent roles, experience modifiers.
    PHost3,
    /// PHost version 4.
    PHost4,
    /// Fleet combat: one battle over all participants.
    Flak,
}

/// Which side of a pairwise fight won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Left,
    Right,
}

impl Algorithm {
    /// Unweighted number of simulation passes a caller should run to cover
    /// the algorithm's seed space once.
    pub fn base_series_length(self) -> i32 {
        match self {
            Algorithm::NuHost => 118,
            _ => 110,
        }
    }
    /// True for the PHost family.
    pub fn is_phost(self) -> bool {
        matches!(self, Algorithm::PHost2 | Algorithm::PHost3 | Algorithm::PHost4)
    }
    /// True when the algorithm labels aggressor/opponent roles.
    pub fn has_roles(self) -> bool {
        matches!(self, Algorithm::PHost3 | Algorithm::PHost4)
    }
    /// True when the algorithm honors experience-level modifiers.
    pub fn has_experience(self) -> bool {
        matches!(self, Algorithm::PHost3 | Algorithm::PHost4)
    }
    /// Damage at which a surviving unit can no longer be sent into the
    /// next fight of the same turn.
    pub fn damage_tech_limit(self) -> i32 {
        if self.is_phost() { 150 } else { 99 }
    }
    /// Resolve one pairwise fight. Both objects are updated in place;
    /// statistics record fighters, torpedo hits, and the fight itself.
    /// Panics on [`Algorithm::Flak`], which is not pairwise.
    pub fn resolve(
        self,
        left: &mut Object,
        right: &mut Object,
        cfg: &HostConfig,
        weapons: &Weapons,
        seed: u32,
        left_stat: &mut Statistic,
        right_stat: &mut Statistic,
    ) -> Winner {
        left.check();
        right.check();
        left_stat.record_fight();
        right_stat.record_fight();
        let mut rng = Rng::new(seed);
        let winner = match self {
            Algorithm::Host => crate::classic::fight(
                left, right, cfg, weapons, &mut rng, false, left_stat, right_stat,
            ),
            Algorithm::NuHost => crate::classic::fight(
                left, right, cfg, weapons, &mut rng, true, left_stat, right_stat,
            ),
            Algorithm::PHost2 | Algorithm::PHost3 | Algorithm::PHost4 => crate::phost::fight(
                left,
                right,
                cfg,
                weapons,
                &mut rng,
                self.has_experience(),
                left_stat,
                right_stat,
            ),
            Algorithm::Flak => panic!("FLAK battles are not pairwise"),
        };
        left_stat.record_fighters_aboard(left.num_fighters);
        right_stat.record_fighters_aboard(right.num_fighters);
        winner
    }
    /// Resolve one fleet battle over all participants in place.
    pub fn resolve_fleet(
        self,
        objects: &mut [Object],
        cfg: &FlakConfig,
        weapons: &Weapons,
        seed: u32,
        stats: &mut [Statistic],
    ) {
        debug_assert!(self == Algorithm::Flak);
        debug_assert!(objects.len() == stats.len());
        let mut rng = Rng::new(seed);
        crate::flak::fight(objects, cfg, weapons, &mut rng, stats);
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Algorithm::Host => write!(f, "Host"),
            Algorithm::NuHost => write!(f, "NuHost"),
            Algorithm::PHost2 => write!(f, "PHost 2"),
            Algorithm::PHost3 => write!(f, "PHost 3"),
            Algorithm::PHost4 => write!(f, "PHost 4"),
            Algorithm::Flak => write!(f, "FLAK"),
        }
    }
}

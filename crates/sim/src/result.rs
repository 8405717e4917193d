use crate::Options;
use nova_combat::Battle;
use nova_combat::Statistic;

/// Outcome of one simulation pass.
///
/// The battles hold before/after state of every fight; `stats` aligns
/// with the setup's unit order (ships first, then the planet). The series
/// metadata tells a Monte-Carlo caller how to weight this pass against
/// the rest of the series.
#[derive(Debug, Clone, Default)]
pub struct SimResult {
    pub battles: Vec<Battle>,
    pub stats: Vec<Statistic>,
    /// Passes a caller should run to cover the seed space once.
    pub series_length: i32,
    /// Relative probability of this outcome within the series.
    pub this_battle_weight: i32,
    /// Sum of weights over the whole series.
    pub total_battle_weight: i32,
    /// Which pass of the series this is.
    pub this_battle_index: i32,
    /// Seed this pass was driven by.
    pub seed: u32,
}

impl SimResult {
    /// Prime the metadata for a pass. Series length and weights depend on
    /// options only; the setup-dependent balancing correction happens in
    /// the run itself.
    pub fn init(&mut self, opts: &Options, this_battle_index: i32) {
        self.battles.clear();
        self.stats.clear();
        self.this_battle_index = this_battle_index;
        self.series_length = opts.mode.algorithm().base_series_length();
        if opts.random_left_right && opts.mode.algorithm().is_phost() {
            self.series_length *= 2;
        }
        self.this_battle_weight = 1;
        self.total_battle_weight = 1;
        self.seed = 0;
    }
    pub fn num_battles(&self) -> usize {
        self.battles.len()
    }
    pub fn battle(&self, index: usize) -> Option<&Battle> {
        self.battles.get(index)
    }
}

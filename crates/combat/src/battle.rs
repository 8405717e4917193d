use crate::Algorithm;
use crate::Object;
use crate::Role;
use crate::Statistic;

/// Immutable record of one resolved battle.
///
/// Holds each participant's state before and after the fight, the role it
/// played, and its statistics. Index 0 is the left side; pairwise
/// algorithms have exactly two participants, FLAK any number.
#[derive(Debug, Clone)]
pub struct Battle {
    algorithm: Algorithm,
    seed: u32,
    before: Vec<Object>,
    after: Vec<Object>,
    stats: Vec<Statistic>,
}

impl Battle {
    pub fn new(
        algorithm: Algorithm,
        seed: u32,
        before: Vec<Object>,
        after: Vec<Object>,
        stats: Vec<Statistic>,
    ) -> Self {
        debug_assert!(before.len() == after.len() && before.len() == stats.len());
        Self {
            algorithm,
            seed,
            before,
            after,
            stats,
        }
    }
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
    pub fn seed(&self) -> u32 {
        self.seed
    }
    pub fn num_objects(&self) -> usize {
        self.before.len()
    }
    /// Participant as it entered the battle.
    pub fn object(&self, index: usize) -> &Object {
        &self.before[index]
    }
    /// Participant as it left the battle.
    pub fn outcome(&self, index: usize) -> &Object {
        &self.after[index]
    }
    pub fn statistic(&self, index: usize) -> &Statistic {
        &self.stats[index]
    }
    pub fn role(&self, index: usize) -> Role {
        self.before[index].role
    }
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.before.iter()
    }
}

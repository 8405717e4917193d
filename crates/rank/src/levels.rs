use nova_core::DROP_PENALTY;
use nova_core::RELIABILITY_SCALE;
use nova_core::RELIABILITY_SPEED;
use nova_core::Slot;
use nova_game::Game;
use nova_game::Root;
use nova_game::User;
use nova_game::max_score;
use nova_game::unpack_score;

/*
    Ranks for reference. Names are provided by the front-end.
    Skill points and turn counts only grow, but reliability can drop;
    promotion and retention therefore use a hysteresis pair.

      1.  Admiral                    50000    90  >95    500       15
      2.  Vice Admiral               25000    90  >95    400       14
      3.  Rear Admiral               16000    90  >95    300       13
      4.  Captain                    12000    80  >85    300       12
      5.  Commander                  9000     80  >85    250       11
      6.  Lieutenant Commander       6500     80  >85    200       10
      7.  Lieutenant                 4000     70  >75    200       9
      8.  Lieutenant Junior Grade    2500     70  >75    150       8
      9.  Ensign                     1750     70  >75    100       7
      10. Senior Chief Petty Officer 1200     60  >65    100       6
      11. Chief Petty Officer        800      60  >65    80        5
      12. Petty Officer              500      60  >65    60        4
      13. Spaceman                   250      50  >55    40        3
      14. Spaceman Apprentice        100      50  >55    20        2
      15. Spaceman Recruit           0        0          0         1
*/

/// One row of the promotion table, indexed by rank - 1.
struct RankDefinition {
    /// Minimum rank points to get this rank.
    min_rank_points: i64,
    /// Minimum rounded reliability to get this rank.
    min_reliability_to_get: i64,
    /// Minimum rounded reliability to keep this rank.
    min_reliability_to_keep: i64,
    /// Minimum turns played to get this rank.
    min_turns_played: i64,
}

const fn def(points: i64, get: i64, keep: i64, turns: i64) -> RankDefinition {
    RankDefinition {
        min_rank_points: points,
        min_reliability_to_get: get,
        min_reliability_to_keep: keep,
        min_turns_played: turns,
    }
}

const RANK_DEFINITIONS: [RankDefinition; 14] = [
    def(100, 55, 50, 20),    // Spaceman Apprentice
    def(250, 55, 50, 40),    // Spaceman
    def(500, 65, 60, 60),    // Petty Officer
    def(800, 65, 60, 80),    // Chief Petty Officer
    def(1200, 65, 60, 100),  // Senior Chief Petty Officer
    def(1750, 75, 70, 100),  // Ensign
    def(2500, 75, 70, 150),  // Lieutenant Junior Grade
    def(4000, 75, 70, 200),  // Lieutenant
    def(6500, 85, 80, 200),  // Lieutenant Commander
    def(9000, 85, 80, 250),  // Commander
    def(12000, 85, 80, 300), // Captain
    def(16000, 95, 90, 300), // Rear Admiral
    def(25000, 95, 90, 400), // Vice Admiral
    def(50000, 95, 90, 500), // Admiral
];

const MAX_RANK: i64 = RANK_DEFINITIONS.len() as i64;

/// The reliability ledger.
pub struct LevelHandler<'a> {
    root: &'a Root,
}

impl<'a> LevelHandler<'a> {
    pub fn new(root: &'a Root) -> Self {
        Self { root }
    }

    /// Record a turn submission or miss for a user.
    ///
    /// `level` is the replacement depth: 0 for the primary player, 1 for
    /// the first replacement, and so on. Deeper replacements lose less
    /// for a missed turn.
    pub fn handle_player_turn(&self, user_id: &str, submit: bool, level: u32) {
        let user = User::new(self.root, user_id);
        if submit {
            user.incr_profile_int("turnsplayed", 1);
        } else {
            user.incr_profile_int("turnsmissed", 1);
        }

        let mut new_points = (RELIABILITY_SCALE * RELIABILITY_SPEED) as i64;
        if !submit && level < 30 {
            new_points -= new_points >> level;
        }
        let reliability =
            user.turn_reliability() * (100 - RELIABILITY_SPEED) as i64 / 100 + new_points;
        user.set_turn_reliability(reliability);

        log::info!(
            "[rank] player '{}': {} points ({}, level {})",
            user_id,
            new_points,
            if submit { "submit" } else { "miss" },
            level
        );
    }

    /// Penalize a user for dropping out of a running game.
    ///
    /// Scaled by standing: dropping while leading costs the full penalty,
    /// dropping from last place costs almost nothing. Requires published
    /// scores; without them (or before the first host) nothing happens.
    pub fn handle_player_drop(&self, user_id: &str, game: &Game, slot: Slot) {
        let turn = game.turn_number();
        if turn <= 0 {
            return;
        }
        let packed = game.turn(turn).scores(&game.referee_score_name());
        let Some(player_score) = unpack_score(&packed, slot) else {
            log::info!("[rank] player '{}': no penalty, player has no score", user_id);
            return;
        };
        let max = max_score(&packed).unwrap_or(-1);
        if player_score < 0 || max <= 0 {
            log::info!("[rank] player '{}': no penalty, score is 0", user_id);
            return;
        }

        let user = User::new(self.root, user_id);
        let old = user.turn_reliability();
        // 64-bit intermediate, truncated: a leader pays DROP_PENALTY
        // percent, the rest proportionally less.
        let new = old * (max as i64 * 100 - player_score as i64 * DROP_PENALTY as i64)
            / (max as i64 * 100);
        user.set_turn_reliability(new);
        log::info!(
            "[rank] player '{}': reliability {}->{} due to dropout, score {}/{}",
            user_id,
            old,
            new,
            player_score,
            max
        );
    }

    /// Add skill points to a user's lifetime total.
    pub fn add_player_rank_points(&self, user_id: &str, points: i64) {
        User::new(self.root, user_id).incr_profile_int("rankpoints", points);
    }

    /// Promote or demote a user as far as the table requires, then mail
    /// and log if anything changed. Promotion needs all three thresholds;
    /// demotion fires when any retention threshold is lost. The get/keep
    /// split keeps ranks from oscillating.
    pub fn handle_player_rank_changes(&self, user_id: &str) {
        let user = User::new(self.root, user_id);
        let mut rank = user.rank();
        let points = user.rank_points();
        let turns = user.turns_played();
        let rounded_reliability =
            (user.turn_reliability() + RELIABILITY_SCALE as i64 / 2) / RELIABILITY_SCALE as i64;

        let mut mail = None;
        while rank < MAX_RANK
            && points >= RANK_DEFINITIONS[rank as usize].min_rank_points
            && rounded_reliability >= RANK_DEFINITIONS[rank as usize].min_reliability_to_get
            && turns >= RANK_DEFINITIONS[rank as usize].min_turns_played
        {
            rank += 1;
            user.set_rank(rank);
            mail = Some("rank-promotion");
        }
        while rank > 0
            && (points < RANK_DEFINITIONS[rank as usize - 1].min_rank_points
                || rounded_reliability < RANK_DEFINITIONS[rank as usize - 1].min_reliability_to_keep
                || turns < RANK_DEFINITIONS[rank as usize - 1].min_turns_played)
        {
            rank -= 1;
            user.set_rank(rank);
            mail = Some("rank-demotion");
        }

        if let Some(template) = mail {
            log::info!("[rank] {} for user {}, new rank: {}", template, user_id, rank);
            self.root.mail().send(
                template,
                &format!("rank-{}", user_id),
                &[
                    ("rank".to_string(), rank.to_string()),
                    ("rankpoints".to_string(), points.to_string()),
                    ("turnreliability".to_string(), rounded_reliability.to_string()),
                    ("turnsplayed".to_string(), turns.to_string()),
                ],
                &[format!("user:{}", user_id)],
            );
        }
    }
}

use serde::Deserialize;
use serde::Serialize;

/// Lifecycle state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    /// Being set up; invisible to the scheduler.
    Preparing,
    /// Accepting players.
    Joining,
    Running,
    Finished,
    Deleted,
}

impl GameState {
    pub const ALL: [GameState; 5] = [
        GameState::Preparing,
        GameState::Joining,
        GameState::Running,
        GameState::Finished,
        GameState::Deleted,
    ];
    pub fn format(self) -> &'static str {
        match self {
            GameState::Preparing => "preparing",
            GameState::Joining => "joining",
            GameState::Running => "running",
            GameState::Finished => "finished",
            GameState::Deleted => "deleted",
        }
    }
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.format() == text)
    }
}

/// Visibility type of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Private,
    Unlisted,
    Public,
    Test,
}

impl GameType {
    pub const ALL: [GameType; 4] = [
        GameType::Private,
        GameType::Unlisted,
        GameType::Public,
        GameType::Test,
    ];
    pub fn format(self) -> &'static str {
        match self {
            GameType::Private => "private",
            GameType::Unlisted => "unlisted",
            GameType::Public => "public",
            GameType::Test => "test",
        }
    }
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.format() == text)
    }
}

/// Joinability of one slot, as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Open,
    /// Played by the requesting user.
    #[serde(rename = "self")]
    Self_,
    Occupied,
    Dead,
}

impl SlotState {
    pub const ALL: [SlotState; 4] = [
        SlotState::Open,
        SlotState::Self_,
        SlotState::Occupied,
        SlotState::Dead,
    ];
    pub fn format(self) -> &'static str {
        match self {
            SlotState::Open => "open",
            SlotState::Self_ => "self",
            SlotState::Occupied => "occupied",
            SlotState::Dead => "dead",
        }
    }
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.format() == text)
    }
}

/// Per-slot turn submission state. Stored as a small integer, possibly
/// OR-ed with [`TURN_IS_TEMPORARY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnState {
    Missing,
    Green,
    Yellow,
    Red,
    Bad,
    Stale,
    /// No turn submitted, but the player was dead.
    Dead,
}

/// Mask extracting the [`TurnState`] from a stored value.
pub const TURN_STATE_MASK: i32 = 15;
/// Bit marking a submitted turn as temporary.
pub const TURN_IS_TEMPORARY: i32 = 16;

impl TurnState {
    pub const ALL: [TurnState; 7] = [
        TurnState::Missing,
        TurnState::Green,
        TurnState::Yellow,
        TurnState::Red,
        TurnState::Bad,
        TurnState::Stale,
        TurnState::Dead,
    ];
    pub fn to_wire(self) -> i32 {
        match self {
            TurnState::Missing => 0,
            TurnState::Green => 1,
            TurnState::Yellow => 2,
            TurnState::Red => 3,
            TurnState::Bad => 4,
            TurnState::Stale => 5,
            TurnState::Dead => 6,
        }
    }
    /// Parse a stored value, ignoring the temporary bit.
    pub fn from_wire(value: i32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.to_wire() == value & TURN_STATE_MASK)
    }
    /// A turn counts as submitted if anything usable arrived.
    pub fn is_submitted(self) -> bool {
        matches!(
            self,
            TurnState::Green | TurnState::Yellow | TurnState::Red | TurnState::Dead
        )
    }
}

/// True if the stored turn value is a real, non-temporary submission.
/// This is the test the early-host and quick-schedule paths use.
pub fn is_turn_in(value: i32) -> bool {
    value & TURN_IS_TEMPORARY == 0
        && TurnState::from_wire(value)
            .map(|s| s.is_submitted())
            .unwrap_or(false)
}

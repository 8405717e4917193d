/// Error taxonomy of the host command surface.
///
/// Every kind maps to one wire reply code. The scheduler swallows
/// [`HostError::Transient`] (logging and moving on) and propagates
/// [`HostError::PreconditionViolated`], which indicates corrupted
/// persisted state. The simulator never returns errors at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("400 Precondition violated: {0}")]
    PreconditionViolated(String),
    #[error("404 Game does not exist")]
    GameNotFound,
    #[error("404 User does not exist")]
    UserNotFound,
    #[error("404 Tool does not exist")]
    ToolNotFound,
    #[error("403 Permission denied")]
    PermissionDenied,
    #[error("412 Wrong game state")]
    WrongGameState,
    #[error("409 Slot not available")]
    SlotNotAvailable,
    #[error("409 Slot is empty")]
    SlotEmpty,
    #[error("400 Invalid value: {0}")]
    InvalidValue(String),
    #[error("500 Transient failure: {0}")]
    Transient(String),
}

pub type Result<T> = std::result::Result<T, HostError>;

impl HostError {
    /// Numeric wire code the command surface replies with.
    pub fn wire_code(&self) -> u16 {
        match self {
            HostError::PreconditionViolated(_) | HostError::InvalidValue(_) => 400,
            HostError::GameNotFound | HostError::UserNotFound | HostError::ToolNotFound => 404,
            HostError::PermissionDenied => 403,
            HostError::WrongGameState => 412,
            HostError::SlotNotAvailable | HostError::SlotEmpty => 409,
            HostError::Transient(_) => 500,
        }
    }
    /// Transients are logged and skipped by the scheduler; everything
    /// else propagates.
    pub fn is_transient(&self) -> bool {
        matches!(self, HostError::Transient(_))
    }
}

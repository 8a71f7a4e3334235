use std::io;

///Timer's error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    ///Thread-style timer can be started only once.
    #[error("Timer has already been started.")]
    AlreadyStarted,
    ///Joining requires timer to be started.
    #[error("Cannot join timer that has not been started.")]
    NotStarted,
    ///Joining finished timer would block forever without timeout.
    #[error("Cannot join timer that is not alive without a timeout")]
    NotAlive,
    ///Timer or its event loop has been destroyed.
    #[error("Timer has been destroyed.")]
    Destroyed,
    ///Platform failure while waiting for timers.
    #[error("Timer OS error: {0}")]
    Io(#[from] io::Error),
}

///Result alias
pub type Result<T> = core::result::Result<T, Error>;

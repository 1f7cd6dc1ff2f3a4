use iso_geom::GeomError;
use iso_network::NetworkError;
use iso_reach::ReachError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Reach(#[from] ReachError),

    #[error(transparent)]
    Geom(#[from] GeomError),
}

pub type SessionResult<T> = Result<T, SessionError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown notification ID {0}")]
    UnknownId(u32),
    #[error("Bus name {0} is already owned by another notification manager")]
    NameTaken(String),
    #[error("Dbus connection error")]
    TransportUnavailable(#[from] zbus::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for zbus::fdo::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::TransportUnavailable(e) => e.into(),
            other => zbus::fdo::Error::Failed(other.to_string()),
        }
    }
}

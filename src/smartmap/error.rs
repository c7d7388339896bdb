use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmartMapError {
    /// A wholesale configuration replacement did not have the expected
    /// shape. Carries the JSON type name of the offending value.
    #[error("invalid configuration: expected a configuration object, got {0}")]
    InvalidConfiguration(String),

    /// A mutation was attempted on a frozen container.
    #[error("cannot modify a frozen container")]
    ImmutableTarget,

    /// An attribute-style access on a container that does not honor them,
    /// either because it never opted in or because the capability was
    /// never installed.
    #[error("no such member: {0}")]
    NoSuchMember(String),
}

pub type Result<T> = std::result::Result<T, SmartMapError>;

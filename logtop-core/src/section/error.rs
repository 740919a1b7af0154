#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line is empty")]
    Empty,

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("malformed timestamp '{0}'")]
    Timestamp(String),

    #[error("malformed request line '{0}'")]
    Request(String),

    #[error("malformed status '{0}'")]
    Status(String),

    #[error("malformed byte count '{0}'")]
    Bytes(String),
}

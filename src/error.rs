pub type AppResult<T> = Result<T, AppErr>;

#[derive(thiserror::Error, Debug)]
pub enum AppErr {
    #[error("invalid room")]
    NoSuchRoom,

    #[error("room full")]
    RoomFull,

    #[error("invalid request")]
    MalformedRequest,

    #[error("room id space exhausted")]
    IdsExhausted,

    #[error("config: {0}")]
    Config(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec: {0}")]
    Codec(#[from] tokio_util::codec::LinesCodecError),
}

impl AppErr {
    /// Protocol error line sent back to the offending client. Internal
    /// failures collapse to a generic reply; the detail goes to the log.
    pub fn wire_reply(&self) -> &'static str {
        match self {
            AppErr::NoSuchRoom => "invalid room",
            AppErr::RoomFull => "room full",
            AppErr::MalformedRequest => "invalid request",
            _ => "server error",
        }
    }
}

use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppErr, AppResult};

pub const DEFAULT_PORT: u16 = 12345;
pub const DEFAULT_ROOM_CAPACITY: usize = 16;
pub const DEFAULT_HEARTBEAT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub room_capacity: usize,
    pub heartbeat: Duration,
}

impl Config {
    /// Read `JAM_*` variables, falling back to the defaults. A variable
    /// that is set but unparseable is a startup error, not a panic.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            port: var("JAM_PORT", DEFAULT_PORT)?,
            room_capacity: var("JAM_ROOM_CAPACITY", DEFAULT_ROOM_CAPACITY)?,
            heartbeat: Duration::from_secs(var("JAM_HEARTBEAT_SECS", DEFAULT_HEARTBEAT_SECS)?),
        })
    }
}

fn var<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    parse_var(name, std::env::var(name).ok(), default)
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>, default: T) -> AppResult<T> {
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|_| AppErr::Config(format!("bad value for {name}: {raw:?}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(parse_var("JAM_PORT", None, DEFAULT_PORT).unwrap(), 12345);
        assert_eq!(
            parse_var("JAM_ROOM_CAPACITY", None, DEFAULT_ROOM_CAPACITY).unwrap(),
            16
        );
        assert_eq!(
            parse_var("JAM_HEARTBEAT_SECS", None, DEFAULT_HEARTBEAT_SECS).unwrap(),
            10
        );
    }

    #[test]
    fn set_values_override_defaults() {
        let port = parse_var("JAM_PORT", Some("9000".into()), DEFAULT_PORT).unwrap();
        assert_eq!(port, 9000);
    }

    #[test]
    fn unparseable_value_is_an_error() {
        assert!(parse_var::<u16>("JAM_PORT", Some("not-a-port".into()), 7).is_err());
    }
}

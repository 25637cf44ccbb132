use std::env;
use std::fmt::Debug;
use std::str::FromStr;

use crate::validation::Limits;

/// The page size used when a listing doesn't ask for one.
pub const DEFAULT_PAGE_SIZE: i32 = 3;

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("must define {} environment variable", name))
}

/// Parses the named environment variable, falling back to `default`
/// if it isn't set. Panics if it's set but can't be parsed.
pub fn get_parsed_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|e| panic!("parse {} ({:?}): {:?}", name, value, e)),
        Err(_) => default,
    }
}

/// Settings shared by every request.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) default_page_size: i32,
    pub(crate) limits: Limits,
}

impl Config {
    pub fn new(default_page_size: i32, limits: Limits) -> Self {
        Self {
            default_page_size,
            limits,
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            get_parsed_or("PLAYERS_DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE),
            Limits::default(),
        )
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, Limits::default())
    }
}

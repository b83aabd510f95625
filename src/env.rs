//! Environment lookups for the `CROSSRUN_*` overrides.
//!
//! Config layering reads the environment through [`Env`] so tests can hand
//! it a fixed map via [`Env::mock()`] instead of touching process state.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

/// Where variable lookups are answered from.
#[derive(Clone, Debug, Default)]
pub struct Env {
    fixed: Option<HashMap<String, String>>,
}

impl Env {
    /// Read from the process environment.
    pub fn real() -> Self {
        Self { fixed: None }
    }

    /// Answer lookups from `vars` only.
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        let fixed = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { fixed: Some(fixed) }
    }

    /// The raw value, if set and non-empty.
    pub fn get(&self, name: &str) -> Option<String> {
        let val = match &self.fixed {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        }?;
        (!val.is_empty()).then_some(val)
    }

    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.get(name).map(PathBuf::from)
    }

    /// Parse the value with [`FromStr`]; `Some(Err(raw))` when it does not parse.
    pub fn parsed<T: FromStr>(&self, name: &str) -> Option<Result<T, String>> {
        let val = self.get(name)?;
        Some(val.trim().parse().map_err(|_| val))
    }

    /// Like [`Env::parsed`] for on/off switches, accepting `1/0`, `yes/no`
    /// and `on/off` as well as `true/false`.
    pub fn flag(&self, name: &str) -> Option<Result<bool, String>> {
        let val = self.get(name)?;
        match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(Ok(true)),
            "false" | "0" | "no" | "off" => Some(Ok(false)),
            _ => Some(Err(val)),
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptive host metadata written once into each job record.

const UNKNOWN: &str = "unknown";

/// Name of the machine running this process.
pub fn hostname() -> String {
    system_hostname().unwrap_or_else(|| from_env(&["HOSTNAME", "COMPUTERNAME"]))
}

/// Login name of the user running this process.
pub fn unixname() -> String {
    system_username().unwrap_or_else(|| from_env(&["USER", "USERNAME", "LOGNAME"]))
}

#[cfg(unix)]
fn system_hostname() -> Option<String> {
    let name = nix::unistd::gethostname().ok()?;
    name.to_str().filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(not(unix))]
fn system_hostname() -> Option<String> {
    None
}

#[cfg(unix)]
fn system_username() -> Option<String> {
    let user = nix::unistd::User::from_uid(nix::unistd::Uid::current()).ok()??;
    Some(user.name)
}

#[cfg(not(unix))]
fn system_username() -> Option<String> {
    None
}

fn from_env(keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

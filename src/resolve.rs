use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf, is_separator};

use crate::env::Environment;

/// Resolve a program name to something that can be spawned.
///
/// First match wins:
/// - `name` exists as given (absolute, or relative to the working directory);
/// - `name` joined onto the current working directory exists;
/// - `name` is a bare file name and exists in one of the `PATH` directories,
///   tried in listed order.
///
/// Only existence is checked. A directory or a non-executable file resolves
/// fine and then fails at spawn time. Nothing is cached: every call looks at
/// the file system and the search path again.
pub fn find_command_path(name: &str, env: &Environment) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    let path = Path::new(name);
    if let Some(found) = find_by_path(path) {
        tracing::debug!(command = name, "resolved as given");
        return Some(found.to_path_buf());
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join(path);
        if candidate.exists() {
            tracing::debug!(command = name, path = %candidate.display(), "resolved against working directory");
            return Some(candidate);
        }
    }

    if name.contains(is_separator) {
        tracing::debug!(command = name, "not found; names with separators skip the search path");
        return None;
    }

    let found = find_in_path(&env.search_paths()?, path.as_os_str());
    match &found {
        Some(p) => tracing::debug!(command = name, path = %p.display(), "resolved on search path"),
        None => tracing::debug!(command = name, "not found"),
    }
    found
}

/// Look for an entry literally named `cmd` in each directory of `search_paths`.
///
/// `cmd` is always appended below the directory, even when it is absolute:
/// `/bin/sh` is looked up as `<dir>/bin/sh`, never as `/bin/sh` itself.
pub fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    let below: PathBuf = Path::new(cmd)
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    if below.as_os_str().is_empty() {
        return None;
    }
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(&below);
        if let Some(path) = find_by_path(&path) {
            return Some(path.to_owned());
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}

//! Environment variable placeholder substitution
//!
//! Two matchers are exposed:
//! - [`substitute_braced`] only recognizes `${VAR}`
//! - [`substitute_loose`] recognizes both `$VAR` and `${VAR}`
//!
//! Variables are resolved through an [`EnvLookup`], so callers can substitute
//! against a fixed map instead of the process environment. A variable that is
//! unset or empty is an error; every missing name in the input is reported at
//! once and nothing is substituted in that case.
//!
//! The file and folder helpers rewrite files in place, working on raw bytes.

use crate::error::{Error, FileFailure, MissingEnvKeys, RequiredEnvKeyMissing, Result};
use regex::bytes::{Captures as ByteCaptures, Regex as ByteRegex};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;
use std::{env, fs};
use tracing::{debug, info};
use walkdir::WalkDir;

static BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)\}").expect("braced placeholder pattern"));

static BRACED_BYTES: LazyLock<ByteRegex> =
    LazyLock::new(|| ByteRegex::new(r"\$\{(\w+)\}").expect("braced placeholder pattern"));

static LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{?(\w+)\}?").expect("loose placeholder pattern"));

/// Source of variable values used during substitution
pub trait EnvLookup {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Reads variables from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<T: EnvLookup + ?Sized> EnvLookup for &T {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

/// Substitute `${VAR}` placeholders
pub fn substitute_braced(content: &str, env: &impl EnvLookup) -> Result<String> {
    substitute_with(&BRACED, content, env)
}

/// Substitute `$VAR` and `${VAR}` placeholders
pub fn substitute_loose(content: &str, env: &impl EnvLookup) -> Result<String> {
    substitute_with(&LOOSE, content, env)
}

/// Look up every distinct name once; all missing names are reported together
fn resolve<'a>(
    tokens: impl Iterator<Item = (&'a str, &'a str)>,
    env: &impl EnvLookup,
) -> Result<HashMap<&'a str, String>> {
    let mut values: HashMap<&str, String> = HashMap::new();
    let mut missing: Vec<RequiredEnvKeyMissing> = Vec::new();

    for (token, name) in tokens {
        if values.contains_key(name) || missing.iter().any(|m| m.key == name) {
            continue;
        }
        debug!("Looking for: {token}");
        match env.lookup(name) {
            Some(value) if !value.is_empty() => {
                values.insert(name, value);
            }
            _ => missing.push(RequiredEnvKeyMissing {
                key: name.to_string(),
            }),
        }
    }

    if !missing.is_empty() {
        return Err(MissingEnvKeys { missing }.into());
    }
    Ok(values)
}

fn substitute_with(re: &Regex, content: &str, env: &impl EnvLookup) -> Result<String> {
    let tokens = re
        .captures_iter(content)
        .filter_map(|caps| Some((caps.get(0)?.as_str(), caps.get(1)?.as_str())));
    let values = resolve(tokens, env)?;
    if values.is_empty() {
        return Ok(content.to_string());
    }

    // a closure replacer inserts values verbatim, `$1` in a value stays `$1`
    let substituted = re.replace_all(content, |caps: &Captures| {
        caps.get(1)
            .and_then(|name| values.get(name.as_str()))
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });
    Ok(substituted.into_owned())
}

/// Substitute `${VAR}` placeholders in raw bytes
///
/// Content that is not UTF-8 is left untouched outside of the placeholders.
pub fn substitute_braced_bytes(content: &[u8], env: &impl EnvLookup) -> Result<Vec<u8>> {
    let tokens = BRACED_BYTES.captures_iter(content).filter_map(|caps| {
        let token = std::str::from_utf8(caps.get(0)?.as_bytes()).ok()?;
        let name = std::str::from_utf8(caps.get(1)?.as_bytes()).ok()?;
        Some((token, name))
    });
    let values = resolve(tokens, env)?;
    if values.is_empty() {
        return Ok(content.to_vec());
    }

    let substituted = BRACED_BYTES.replace_all(content, |caps: &ByteCaptures| {
        caps.get(1)
            .and_then(|name| std::str::from_utf8(name.as_bytes()).ok())
            .and_then(|name| values.get(name))
            .map(|value| value.as_bytes().to_vec())
            .unwrap_or_else(|| caps[0].to_vec())
    });
    Ok(substituted.into_owned())
}

fn matches_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// Substitute `${VAR}` placeholders in a file, rewriting it in place
///
/// With a non-empty `extensions` list, only files whose name ends with one
/// of the suffixes are touched. The content is treated as raw bytes, so
/// binary files pass through. Returns whether the file was rewritten.
pub fn substitute_in_file(
    path: &Path,
    extensions: &[String],
    env: &impl EnvLookup,
) -> Result<bool> {
    if !matches_extension(path, extensions) {
        return Ok(false);
    }
    debug!("Substituting env variables in: {}", path.display());

    let permissions = fs::metadata(path)?.permissions();
    let content = fs::read(path)?;
    let substituted = substitute_braced_bytes(&content, env)?;
    fs::write(path, substituted)?;
    fs::set_permissions(path, permissions)?;
    Ok(true)
}

/// Substitute `${VAR}` placeholders in every regular file below `root`
///
/// Symbolic links are neither followed nor rewritten. A failing file does not
/// stop the walk: all failures are collected and returned together in
/// [`Error::Folder`]; files processed successfully keep their new content.
/// Returns the number of files rewritten.
pub fn substitute_in_folder(
    root: &Path,
    extensions: &[String],
    env: &impl EnvLookup,
) -> Result<usize> {
    let mut rewritten = 0;
    let mut failures = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                failures.push(FileFailure {
                    path,
                    error: err.into(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match substitute_in_file(entry.path(), extensions, env) {
            Ok(true) => rewritten += 1,
            Ok(false) => {}
            Err(error) => failures.push(FileFailure {
                path: entry.into_path(),
                error,
            }),
        }
    }

    if !failures.is_empty() {
        return Err(Error::Folder { failures });
    }
    info!("Substituted env variables in {rewritten} file(s) under {}", root.display());
    Ok(rewritten)
}

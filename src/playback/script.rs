//! Playback script loading.
//!
//! A script is plain text with one opaque command per line. Blank lines
//! carry no command and are dropped, so they never occupy a step index.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BiteError, Result};

/// Split raw script text into its ordered commands.
///
/// Lines are split on `\n` (a trailing `\r` is removed) and whitespace-only
/// lines are dropped. Command text is otherwise kept verbatim.
pub fn parse_script(raw: &str) -> Vec<String> {
    raw.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(String::from)
        .collect()
}

/// A script loaded from disk.
#[derive(Debug, Clone)]
pub struct Script {
    path: PathBuf,
    raw: String,
    steps: Vec<String>,
    fingerprint: String,
}

impl Script {
    /// Load and parse a script file.
    ///
    /// # Errors
    ///
    /// Returns `ScriptNotFound` if the file doesn't exist and `EmptyScript`
    /// if it contains no commands.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BiteError::ScriptNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                BiteError::Io(e)
            }
        })?;

        Self::from_source(path, raw)
    }

    /// Build a script from already-read text.
    pub fn from_source(path: &Path, raw: String) -> Result<Self> {
        let steps = parse_script(&raw);
        if steps.is_empty() {
            return Err(BiteError::EmptyScript {
                path: path.to_path_buf(),
            });
        }

        let fingerprint = fingerprint(&steps);
        Ok(Self {
            path: path.to_path_buf(),
            raw,
            steps,
            fingerprint,
        })
    }

    /// Path the script was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw script text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed commands in dispatch order.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Content fingerprint (16 hex chars) used to match saved playback state.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Hash the parsed commands, so edits to blank lines don't invalidate resume.
fn fingerprint(steps: &[String]) -> String {
    let mut hasher = Sha256::new();
    for step in steps {
        hasher.update(step.as_bytes());
        hasher.update(b"\n");
    }
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

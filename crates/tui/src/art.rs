//! Walk-art asset loading.
//!
//! The matched wanderer view renders a text-art panel from a file resolved
//! relative to the working directory. A missing file is a render-time
//! failure, not a fallback.

use std::{fs, path::Path};

use anyhow::{Context, Result};

/// Read the art file into displayable lines.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("missing walk art asset {}", path.display()))?;
    Ok(content
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect())
}

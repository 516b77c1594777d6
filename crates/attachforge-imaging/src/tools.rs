//! Locating the ImageMagick executables.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// ImageMagick 7 entry point.
pub const MAGICK: &str = "magick";

/// ImageMagick 6 entry point.
pub const CONVERT: &str = "convert";

/// An ImageMagick entry point as found on this system.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    /// Resolved executable, `None` when not on `PATH`.
    pub path: Option<PathBuf>,
    /// First line of `-version` output.
    pub version: Option<String>,
}

impl ToolInfo {
    pub fn available(&self) -> bool {
        self.version.is_some()
    }
}

/// Look a tool up on `PATH` and ask it for its version.
///
/// ```no_run
/// let info = attachforge_imaging::check_tool("magick");
/// println!("{}: {:?}", info.name, info.version);
/// ```
pub fn check_tool(name: &str) -> ToolInfo {
    let path = which::which(name).ok();
    let version = path.as_deref().and_then(version_line);

    ToolInfo {
        name: name.to_string(),
        path,
        version,
    }
}

/// Both ImageMagick entry points, newest first.
pub fn check_tools() -> Vec<ToolInfo> {
    [MAGICK, CONVERT].into_iter().map(check_tool).collect()
}

/// Path of a tool on `PATH`.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// A configured path if it exists, otherwise a `PATH` lookup of `name`.
pub fn get_tool_path(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        _ => require_tool(name),
    }
}

fn version_line(program: &Path) -> Option<String> {
    let output = Command::new(program).arg("-version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|line| line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: &str = "attachforge_missing_tool";

    #[test]
    fn test_missing_tool() {
        let info = check_tool(MISSING);
        assert!(!info.available());
        assert!(info.path.is_none());
        assert!(matches!(
            require_tool(MISSING).unwrap_err(),
            Error::ToolNotFound { ref tool } if tool == MISSING
        ));
    }

    #[test]
    fn test_check_tools_lists_both_entry_points() {
        let names: Vec<_> = check_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec![MAGICK, CONVERT]);
    }

    #[test]
    fn test_configured_path_wins() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(get_tool_path(MISSING, Some(file.path())).unwrap(), file.path());
        assert!(get_tool_path(MISSING, Some(Path::new("/nonexistent/dir/magick"))).is_err());
    }
}

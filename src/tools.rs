// External tool resolver for ffmpeg
//
// Resolution order:
// 1) Environment variable override (CLIPFORGE_FFMPEG_PATH)
// 2) Binary next to the clipforge executable (or in its bin/ subdirectory)
// 3) PATH fallback

use std::env;
use std::path::PathBuf;

use crate::constants::FFMPEG_ENV_KEY;

fn exe_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
}

fn resolve_tool(env_key: &str, default_name: &str) -> PathBuf {
    // 1) Check environment variable override
    if let Ok(v) = env::var(env_key) {
        let p = PathBuf::from(&v);
        if p.exists() {
            return p;
        }
        log::warn!("{} points at missing file {}; ignoring", env_key, v);
    }

    // Add .exe on Windows
    let mut filename = default_name.to_string();
    if cfg!(windows) && !filename.to_lowercase().ends_with(".exe") {
        filename.push_str(".exe");
    }

    // 2) Check next to the executable, then its bin/ subdirectory
    if let Some(dir) = exe_dir() {
        for candidate in [dir.join(&filename), dir.join("bin").join(&filename)] {
            if candidate.exists() {
                return candidate;
            }
        }
    }

    // 3) Fall back to PATH
    PathBuf::from(default_name)
}

/// Get path to ffmpeg binary
pub fn ffmpeg_path() -> PathBuf {
    resolve_tool(FFMPEG_ENV_KEY, "ffmpeg")
}

/// Check whether the resolved ffmpeg runs
pub fn is_ffmpeg_available() -> bool {
    std::process::Command::new(ffmpeg_path())
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_tool_fallback() {
        let path = resolve_tool("CLIPFORGE_TEST_NONEXISTENT", "clipforge-testcmd");
        assert_eq!(path, PathBuf::from("clipforge-testcmd"));
    }

    #[test]
    fn test_env_override() {
        let temp = tempfile::NamedTempFile::new().unwrap();

        std::env::set_var("CLIPFORGE_TEST_TOOL", temp.path());
        let path = resolve_tool("CLIPFORGE_TEST_TOOL", "default");
        std::env::remove_var("CLIPFORGE_TEST_TOOL");

        assert_eq!(path, temp.path());
    }

    #[test]
    fn test_env_override_to_missing_file_ignored() {
        std::env::set_var("CLIPFORGE_TEST_MISSING", "/definitely/not/here/ffmpeg");
        let path = resolve_tool("CLIPFORGE_TEST_MISSING", "clipforge-fallback");
        std::env::remove_var("CLIPFORGE_TEST_MISSING");

        assert_eq!(path, PathBuf::from("clipforge-fallback"));
    }
}

use std::path::{Path, PathBuf};

pub const DATA_DIR_NAME: &str = ".ascent";

/// Resolve the data directory holding config.yaml and the database.
///
/// Priority:
/// 1. `--data-dir` flag / `ASCENT_DATA` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.ascent/`
/// 3. Fall back to `cwd/.ascent`
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut dir = cwd.clone();
    loop {
        let candidate = dir.join(DATA_DIR_NAME);
        if candidate.is_dir() {
            return candidate;
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => break,
        }
    }

    cwd.join(DATA_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_dir_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_data_dir(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn explicit_dir_needs_no_existing_directory() {
        // Commands like `init` resolve the path before anything exists.
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing/.ascent");
        let result = resolve_data_dir(Some(&target));
        assert_eq!(result, target);
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("failed to read roster {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("roster {path:?} does not list any participants")]
    Empty { path: PathBuf },
}

/// One participant name per line. Blank lines and `#` comments are skipped;
/// duplicates are left for the ledger to reject.
pub fn parse_roster(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn load_roster(path: &Path) -> Result<Vec<String>, RosterError> {
    let contents = fs::read_to_string(path).map_err(|source| RosterError::Read {
        source,
        path: path.to_path_buf(),
    })?;
    let names = parse_roster(&contents);
    if names.is_empty() {
        return Err(RosterError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_lines_and_comments() {
        let names = parse_roster("# league night\nAda\n\n  Bob  \r\n#Cy\nDee\n");
        assert_eq!(names, ["Ada", "Bob", "Dee"]);
    }

    #[test]
    fn keeps_duplicates_for_the_ledger() {
        assert_eq!(parse_roster("Ada\nAda\n"), ["Ada", "Ada"]);
    }

    #[test]
    fn empty_roster_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("players.txt");
        fs::write(&path, "\n# nobody yet\n").expect("write roster");
        assert!(matches!(
            load_roster(&path),
            Err(RosterError::Empty { .. })
        ));
    }
}

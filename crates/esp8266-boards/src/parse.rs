//! TOML loading, validation, and discovery for custom board definitions.
//!
//! Custom boards live in `*.boards.toml` files:
//!
//! ```toml
//! [[board]]
//! id = "my_pcb"
//! name = "My PCB rev B"
//! flash-size = "4MB"
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::board::{Board, BoardCatalog};
use crate::error::{BoardError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoardFile {
    #[serde(default)]
    board: Vec<Board>,
}

/// Load custom boards from a `.boards.toml` file.
pub fn load_boards_toml(path: &Path) -> Result<BoardCatalog> {
    if !path.exists() {
        return Err(BoardError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let catalog = parse_boards_toml(&content)?;
    tracing::debug!(path = %path.display(), boards = catalog.len(), "loaded custom boards");
    Ok(catalog)
}

/// Parse and validate custom boards from a TOML string.
pub fn parse_boards_toml(toml_str: &str) -> Result<BoardCatalog> {
    let file: BoardFile = toml::from_str(toml_str)?;
    validate_boards(&file.board)?;
    let mut catalog = BoardCatalog::new();
    for board in file.board {
        catalog.insert(board);
    }
    Ok(catalog)
}

/// Check board definitions for empty or duplicate identifiers.
pub fn validate_boards(boards: &[Board]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for board in boards {
        if board.id.trim().is_empty() {
            return Err(BoardError::Validation {
                detail: format!("board '{}' has an empty id", board.name),
            });
        }
        if !seen.insert(board.id.as_str()) {
            return Err(BoardError::Validation {
                detail: format!("board id '{}' is defined more than once", board.id),
            });
        }
    }
    Ok(())
}

/// Discover all `.boards.toml` files in `dir`, sorted by file name.
pub fn discover_board_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_board_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".boards.toml"));
        if is_board_file {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Builtin catalog extended with every board file found in `dir`.
pub fn catalog_with_dir(dir: &Path) -> Result<BoardCatalog> {
    let mut catalog = BoardCatalog::builtin();
    for path in discover_board_files(dir)? {
        catalog.merge(load_boards_toml(&path)?);
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::FlashSize;

    const TWO_BOARDS: &str = r#"
[[board]]
id = "my_pcb"
name = "My PCB rev B"
flash-size = "4MB"

[[board]]
id = "tiny"
name = "Tiny"
flash-size = "1MB"
"#;

    #[test]
    fn parse_board_file() {
        let catalog = parse_boards_toml(TWO_BOARDS).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("tiny").unwrap().flash_size, FlashSize::Mb1);
    }

    #[test]
    fn parse_empty_file() {
        let catalog = parse_boards_toml("").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn parse_invalid_returns_error() {
        assert!(parse_boards_toml("this is not valid toml [[[").is_err());
        assert!(parse_boards_toml("[[board]]\nid = \"x\"\n").is_err());
    }

    #[test]
    fn reject_unknown_flash_size() {
        let toml_str = "[[board]]\nid = \"x\"\nname = \"X\"\nflash-size = \"3MB\"\n";
        assert!(matches!(
            parse_boards_toml(toml_str).unwrap_err(),
            BoardError::Toml(_)
        ));
    }

    #[test]
    fn reject_duplicate_ids() {
        let toml_str = r#"
[[board]]
id = "dup"
name = "A"
flash-size = "4MB"

[[board]]
id = "dup"
name = "B"
flash-size = "2MB"
"#;
        let err = parse_boards_toml(toml_str).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn reject_empty_id() {
        let boards = vec![Board::new("  ", "Nameless", FlashSize::Mb4)];
        assert!(matches!(
            validate_boards(&boards).unwrap_err(),
            BoardError::Validation { .. }
        ));
    }

    #[test]
    fn load_not_found() {
        let result = load_boards_toml(Path::new("/nonexistent/custom.boards.toml"));
        assert!(matches!(result.unwrap_err(), BoardError::NotFound { .. }));
    }

    #[test]
    fn discover_and_merge() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.boards.toml"), TWO_BOARDS).unwrap();
        std::fs::write(
            dir.path().join("b.boards.toml"),
            "[[board]]\nid = \"nodemcuv2\"\nname = \"Patched\"\nflash-size = \"16MB\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let files = discover_board_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);

        let catalog = catalog_with_dir(dir.path()).unwrap();
        assert!(catalog.contains("my_pcb"));
        assert!(catalog.contains("d1_mini"));
        assert_eq!(catalog.get("nodemcuv2").unwrap().flash_size, FlashSize::Mb16);
    }

    #[test]
    fn discover_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let files = discover_board_files(&dir.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }
}

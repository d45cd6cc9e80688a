use std::path::Path;

use ab_glyph::FontVec;

use crate::snapshot::domain::image_io::SnapshotError;

/// Loads a TrueType/OpenType font for snapshot labels.
pub fn load_label_font(path: &Path) -> Result<FontVec, SnapshotError> {
    let bytes = std::fs::read(path).map_err(|source| SnapshotError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(bytes).map_err(|source| SnapshotError::InvalidFont {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_label_font(&dir.path().join("absent.ttf"));
        assert!(matches!(result, Err(SnapshotError::FontRead { .. })));
    }

    #[test]
    fn test_garbage_bytes_are_invalid_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();

        match load_label_font(&path) {
            Err(SnapshotError::InvalidFont { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected invalid font, got {:?}", other.map(|_| ())),
        }
    }
}

use std::io::{Read, Write};

/// Safely writes a document to `path` as `prefix` followed by `suffix`
/// (the two runs of a gap buffer), replacing any previous contents.
///
/// The write goes to a temporary file in the same directory, which is
/// strictly required for the atomic rename; the result then gets the
/// conventional 0644 mode, since the temp file is created private.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written,
/// or if the atomic rename fails.
pub fn save_atomic(
    path: impl AsRef<std::path::Path>,
    prefix: &[u8],
    suffix: &[u8],
) -> std::io::Result<()> {
    let path = path.as_ref();
    let parent_dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));

    let mut temp_save_file = tempfile::Builder::new()
        .prefix(".save_tmp_")
        .tempfile_in(parent_dir)?;

    temp_save_file.write_all(prefix)?;
    temp_save_file.write_all(suffix)?;
    temp_save_file.as_file().sync_all()?;
    temp_save_file.persist(path).map_err(|e| e.error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))?;
    }

    Ok(())
}

/// Drains standard input to a byte vector, for `prog | ted` usage.
///
/// # Errors
///
/// Returns an error if reading from standard input fails.
pub fn read_stdin() -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    std::io::stdin().lock().read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_writes_prefix_then_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        save_atomic(&target, b"front ", b"back").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"front back");
    }

    #[test]
    fn test_save_truncates_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        std::fs::write(&target, b"a much longer previous body").unwrap();

        save_atomic(&target, b"tiny", b"").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"tiny");
    }

    #[cfg(unix)]
    #[test]
    fn test_save_sets_conventional_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        save_atomic(&target, b"x", b"").unwrap();

        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}

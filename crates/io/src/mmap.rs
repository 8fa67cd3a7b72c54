/// Read-only memory map of a file on disk, used by the document load path.
/// The OS pages the file in lazily; the editor copies the slice into its
/// own edit buffer and drops the map, so the mapping never outlives a load.
#[derive(Debug)]
pub struct MmapFile {
    _file: std::fs::File,
    mmap: memmap2::Mmap,
    path: std::path::PathBuf,
}

impl MmapFile {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path_buf)?;

        // SAFETY:
        // - File is opened read-only
        // - We keep the file handle alive in struct
        // - Caller only gets immutable &[u8]
        let mmap = unsafe { memmap2::Mmap::map(&file)? };

        Ok(Self {
            _file: file,
            mmap,
            path: path_buf,
        })
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    /// File length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of mapped file.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

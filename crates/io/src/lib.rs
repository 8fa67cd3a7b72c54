//! File access for the editor: memory-mapped reads for document loading,
//! atomic writes for saving, and stdin ingestion.

pub mod file;
pub mod mmap;

use std::fs::File;
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;

use memmap2::MmapOptions;

/// Holds record file data, either a read-only mapping or an owned buffer.
/// Dereferences to `&[u8]` so parsers don't care which one they got.
pub enum FileData {
    Mmap(memmap2::Mmap),
    Owned(Vec<u8>),
}

impl Deref for FileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileData::Mmap(m) => m,
            FileData::Owned(v) => v,
        }
    }
}

/// Files under 1MB are read into a Vec; mapping them costs more than it saves.
const MMAP_THRESHOLD: u64 = 1024 * 1024;

/// Read a whole file, mapping it when large enough.
pub fn read_file(path: &Path) -> io::Result<FileData> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    let len = metadata.len();

    if len == 0 {
        return Ok(FileData::Owned(Vec::new()));
    }

    if len < MMAP_THRESHOLD || !metadata.file_type().is_file() {
        let mut buf = Vec::with_capacity(len as usize);
        let mut reader = file;
        reader.read_to_end(&mut buf)?;
        return Ok(FileData::Owned(buf));
    }

    // SAFETY: read-only mapping of a regular file. Concurrent truncation by
    // another process is outside what this tool guards against.
    match unsafe { MmapOptions::new().map(&file) } {
        Ok(mmap) => {
            #[cfg(target_os = "linux")]
            {
                let _ = mmap.advise(memmap2::Advice::Sequential);
            }
            Ok(FileData::Mmap(mmap))
        }
        Err(_) => {
            let mut buf = Vec::with_capacity(len as usize);
            let mut reader = file;
            reader.read_to_end(&mut buf)?;
            Ok(FileData::Owned(buf))
        }
    }
}

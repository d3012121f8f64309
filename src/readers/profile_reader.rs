use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

use crate::error::{ProfileError, Result};
use crate::utils::constants::DEFAULT_BUFFER_SIZE;

/// Loads a profile file into memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileReader {
    use_mmap: bool,
}

impl ProfileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read the whole file as text
    pub fn read_to_string(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(ProfileError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = if self.use_mmap {
            self.read_mmap(path)?
        } else {
            self.read_buffered(path)?
        };

        if content.trim().is_empty() {
            return Err(ProfileError::EmptyFile {
                path: path.to_path_buf(),
            });
        }

        debug!("Loaded {} bytes from {}", content.len(), path.display());
        Ok(content)
    }

    /// Read using buffered I/O
    fn read_buffered(&self, path: &Path) -> Result<String> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(content)
    }

    /// Read using memory-mapped I/O for large files
    fn read_mmap(&self, path: &Path) -> Result<String> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(String::new());
        }

        let mmap = unsafe { Mmap::map(&file)? };
        let content = std::str::from_utf8(&mmap)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(content.to_string())
    }
}

use super::codec;
use crate::error::{MemError, Result};
use crate::mem::PhysMem;
use byteorder::{ByteOrder, LittleEndian};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

//===========================================================================//

/// The disk-resident backing store for swapped-out pages.
///
/// Each page lives in its own file, `page-<daddr>.txt`, inside the store's
/// directory.  Which disk address belongs to which physical frame is up to
/// the caller; the store just moves whole pages between files and frames.
pub struct SwapStore {
    dir: PathBuf,
    // None once the last disk address has been handed out.
    next_daddr: Option<u64>,
}

impl SwapStore {
    /// Opens the swap store in the given directory.  The directory need not
    /// exist yet; it is created on the first swap-out.
    ///
    /// Disk addresses handed out by [`allocate_daddr`](Self::allocate_daddr)
    /// start just past the highest page already in the directory.
    pub fn open<P: Into<PathBuf>>(dir: P) -> io::Result<SwapStore> {
        let dir = dir.into();
        let mut highest: Option<u64> = None;
        match fs::read_dir(&dir) {
            Ok(entries) => {
                for entry in entries {
                    let name = entry?.file_name();
                    if let Some(daddr) =
                        name.to_str().and_then(parse_page_file_name)
                    {
                        highest = highest.max(Some(daddr));
                    }
                }
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(error),
        }
        let next_daddr = match highest {
            Some(daddr) => daddr.checked_add(1),
            None => Some(0),
        };
        debug!(dir = %dir.display(), ?next_daddr, "opened swap store");
        Ok(SwapStore { dir, next_daddr })
    }

    /// Returns the directory holding the page files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the file that holds page `daddr`.
    pub fn page_path(&self, daddr: u64) -> PathBuf {
        self.dir.join(format!("page-{daddr}.txt"))
    }

    /// Returns true if page `daddr` has been swapped out to this store.
    pub fn contains(&self, daddr: u64) -> bool {
        self.page_path(daddr).is_file()
    }

    /// Returns a disk address that has never been handed out by this store
    /// and has no page file yet, or [`MemError::SwapExhausted`] once every
    /// address up to `u64::MAX` has been used.
    pub fn allocate_daddr(&mut self) -> Result<u64> {
        loop {
            let daddr = self.next_daddr.ok_or(MemError::SwapExhausted)?;
            self.next_daddr = daddr.checked_add(1);
            if !self.contains(daddr) {
                return Ok(daddr);
            }
        }
    }

    /// Loads page `daddr` into physical frame `ppn`.
    ///
    /// The page file must exist; a missing file means the caller's page
    /// tables are out of sync with the store, and is reported as
    /// [`MemError::SwapMissing`].  The whole page is parsed before the frame
    /// is touched, so on any error the frame keeps its old contents.
    pub fn swap_in(
        &self,
        mem: &mut PhysMem,
        daddr: u64,
        ppn: u64,
    ) -> Result<()> {
        let span = mem.frame_span(ppn)?;
        let path = self.page_path(daddr);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(MemError::SwapMissing { daddr, path });
            }
            Err(source) => {
                return Err(MemError::SwapIo { daddr, path, source });
            }
        };
        let mut reader = BufReader::new(file);
        let words = codec::read_page(&mut reader, mem.page_word_count())
            .map_err(|error| page_error(daddr, &path, error))?;
        LittleEndian::write_u64_into(&words, mem.bytes_mut(span)?);
        debug!(daddr, ppn, path = %path.display(), "swapped page in");
        Ok(())
    }

    /// Saves physical frame `ppn` as page `daddr`, replacing any previous
    /// contents of that page.
    ///
    /// The page is written to a temporary file that is renamed into place
    /// only once complete, so a failed swap-out never leaves a partial page
    /// behind.
    pub fn swap_out(
        &self,
        mem: &PhysMem,
        daddr: u64,
        ppn: u64,
    ) -> Result<()> {
        let span = mem.frame_span(ppn)?;
        let mut words = vec![0u64; mem.page_word_count()];
        LittleEndian::read_u64_into(mem.bytes(span)?, &mut words);
        let path = self.page_path(daddr);
        let temp_path = path.with_extension("txt.tmp");
        let result = fs::create_dir_all(&self.dir)
            .and_then(|()| write_page_file(&temp_path, &path, &words));
        if let Err(source) = result {
            if let Err(error) = fs::remove_file(&temp_path)
                && error.kind() != io::ErrorKind::NotFound
            {
                warn!(path = %temp_path.display(), %error,
                      "could not remove partial swap page");
            }
            return Err(MemError::SwapIo { daddr, path, source });
        }
        debug!(daddr, ppn, path = %path.display(), "swapped page out");
        Ok(())
    }
}

//===========================================================================//

fn write_page_file(
    temp_path: &Path,
    path: &Path,
    words: &[u64],
) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(temp_path)?);
    codec::write_page(&mut writer, words)?;
    writer.into_inner()?.sync_all()?;
    fs::rename(temp_path, path)
}

fn page_error(daddr: u64, path: &Path, error: io::Error) -> MemError {
    if error.kind() == io::ErrorKind::InvalidData {
        MemError::SwapFormat { daddr, message: error.to_string() }
    } else {
        MemError::SwapIo { daddr, path: path.to_path_buf(), source: error }
    }
}

fn parse_page_file_name(name: &str) -> Option<u64> {
    let digits = name.strip_prefix("page-")?.strip_suffix(".txt")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

//===========================================================================//


//===========================================================================//

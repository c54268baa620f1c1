// ─── Overlay Merge ───
// Combines a base zip and an overlay zip into a new archive. Overlay entries
// win on name collisions; every entry is copied as its raw compressed record,
// so compression method, timestamps, permissions and CRC stay untouched.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use zip::result::{ZipError, ZipResult};
use zip::{ZipArchive, ZipWriter};

use super::error::{ArchiveRole, MergeError};

/// Output handle that records whether any write or seek on it failed.
struct OutputStream<W> {
    inner: W,
    failed: Arc<AtomicBool>,
}

impl<W> OutputStream<W> {
    fn track<T>(&self, result: io::Result<T>) -> io::Result<T> {
        if result.is_err() {
            self.failed.store(true, Ordering::Relaxed);
        }
        result
    }
}

impl<W: Write> Write for OutputStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = self.inner.write(buf);
        self.track(result)
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = self.inner.flush();
        self.track(result)
    }
}

impl<W: Seek> Seek for OutputStream<W> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let result = self.inner.seek(pos);
        self.track(result)
    }
}

/// Streams entries from source archives into one output archive, skipping
/// any name that has already been written.
pub struct ZipMerger<W: Write + Seek> {
    writer: ZipWriter<OutputStream<W>>,
    output_failed: Arc<AtomicBool>,
    /// Names already emitted to the output.
    seen: HashSet<String>,
}

impl<W: Write + Seek> ZipMerger<W> {
    pub fn new(output: W) -> Self {
        let output_failed = Arc::new(AtomicBool::new(false));
        Self {
            writer: ZipWriter::new(OutputStream {
                inner: output,
                failed: Arc::clone(&output_failed),
            }),
            output_failed,
            seen: HashSet::new(),
        }
    }

    /// Copy every entry of `archive` whose name has not been emitted yet,
    /// in the archive's own enumeration order. Shadowed entries are skipped
    /// silently.
    ///
    /// Each copied entry is decoded in full first, so a damaged payload or
    /// CRC mismatch fails here instead of landing in the output.
    pub fn append<R: Read + Seek>(
        &mut self,
        archive: &mut ZipArchive<R>,
        role: ArchiveRole,
    ) -> Result<(), MergeError> {
        for index in 0..archive.len() {
            let name = archive
                .by_index_raw(index)
                .map_err(|source| MergeError::Copy {
                    role,
                    entry: format!("#{}", index),
                    source,
                })?
                .name()
                .to_string();

            if self.seen.contains(&name) {
                continue;
            }

            let copy_error = |role, source| MergeError::Copy {
                role,
                entry: name.clone(),
                source,
            };

            {
                let mut decoded = archive.by_index(index).map_err(|e| copy_error(role, e))?;
                io::copy(&mut decoded, &mut io::sink())
                    .map_err(|e| copy_error(role, ZipError::Io(e)))?;
            }

            let entry = archive.by_index_raw(index).map_err(|e| copy_error(role, e))?;
            self.writer.raw_copy_file(entry).map_err(|e| {
                if self.output_failed.load(Ordering::Relaxed) {
                    copy_error(ArchiveRole::Output, e)
                } else {
                    copy_error(role, e)
                }
            })?;
            self.seen.insert(name);
        }

        Ok(())
    }

    /// Number of distinct entries written so far.
    pub fn entry_count(&self) -> usize {
        self.seen.len()
    }

    /// Write the central directory and hand back the underlying stream.
    pub fn finish(self) -> ZipResult<W> {
        Ok(self.writer.finish()?.inner)
    }
}

/// Merge `overlay` on top of `base` into the file at `output` and return the
/// number of entries written.
///
/// The base file handle is acquired first so a missing base fails before the
/// output is created or the overlay is read. The output is then created
/// (a directory or an unwritable location fails here, before either input is
/// parsed), the overlay is copied in full, and finally every base entry not
/// shadowed by the overlay.
///
/// On error the output file is left as-is; callers must discard it.
pub fn merge_zips(base: &Path, overlay: &Path, output: &Path) -> Result<usize, MergeError> {
    let base_file = File::open(base)
        .map_err(|e| MergeError::open(ArchiveRole::Base, Some(base), ZipError::Io(e)))?;

    let output_file = File::create(output)
        .map_err(|e| MergeError::open(ArchiveRole::Output, Some(output), ZipError::Io(e)))?;

    let overlay_file = File::open(overlay)
        .map_err(|e| MergeError::open(ArchiveRole::Overlay, Some(overlay), ZipError::Io(e)))?;

    let mut merger = ZipMerger::new(BufWriter::new(output_file));

    {
        let mut overlay_zip = ZipArchive::new(BufReader::new(overlay_file))
            .map_err(|e| MergeError::open(ArchiveRole::Overlay, Some(overlay), e))?;
        merger.append(&mut overlay_zip, ArchiveRole::Overlay)?;
    }

    {
        let mut base_zip = ZipArchive::new(BufReader::new(base_file))
            .map_err(|e| MergeError::open(ArchiveRole::Base, Some(base), e))?;
        merger.append(&mut base_zip, ArchiveRole::Base)?;
    }

    let entries = merger.entry_count();
    let buffered = merger
        .finish()
        .map_err(|e| MergeError::finalize(Some(output), e))?;
    let file = buffered
        .into_inner()
        .map_err(|e| MergeError::finalize(Some(output), ZipError::Io(e.into_error())))?;
    file.sync_all()
        .map_err(|e| MergeError::finalize(Some(output), ZipError::Io(e)))?;

    Ok(entries)
}

/// Stream form of [`merge_zips`] for already-open seekable handles.
///
/// Returns the output stream positioned after the finished archive.
pub fn merge_zip_streams<B, O, W>(base: B, overlay: O, output: W) -> Result<W, MergeError>
where
    B: Read + Seek,
    O: Read + Seek,
    W: Write + Seek,
{
    let mut merger = ZipMerger::new(output);

    let mut overlay_zip =
        ZipArchive::new(overlay).map_err(|e| MergeError::open(ArchiveRole::Overlay, None, e))?;
    merger.append(&mut overlay_zip, ArchiveRole::Overlay)?;
    drop(overlay_zip);

    let mut base_zip =
        ZipArchive::new(base).map_err(|e| MergeError::open(ArchiveRole::Base, None, e))?;
    merger.append(&mut base_zip, ArchiveRole::Base)?;
    drop(base_zip);

    merger.finish().map_err(|e| MergeError::finalize(None, e))
}

//! Final copy/archive step of a flush
//!
//! Moves accumulated temp files to their destination and deletes every temp
//! file before returning, success or failure. Deletion is best effort: a
//! failed delete is logged and never escalated.

use std::collections::HashSet;
use std::fs;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, OutputError, Result};
use crate::output::destination::{Destination, StreamSink, TaskOutput};
use crate::output::writer::PopulatedFileOutput;

/// Copy every accumulated entry to the destination, deleting each temp file
/// as it is consumed. On an error abort the remaining temp files are still
/// deleted before this returns.
pub(crate) fn execute_copy_and_delete(
    mut entries: Vec<PopulatedFileOutput>,
    destination: Option<&Destination>,
) -> Result<()> {
    let result = dispatch(&mut entries, destination);
    for entry in entries.drain(..) {
        delete_temp(entry.temp_path());
    }
    result
}

fn dispatch(entries: &mut Vec<PopulatedFileOutput>, destination: Option<&Destination>) -> Result<()> {
    let destination = destination.ok_or(Error::Output(OutputError::DestinationNotSet))?;
    match destination.output() {
        TaskOutput::File(path) => copy_to_file(entries, path, destination.overwrite()),
        TaskOutput::Directory(path) => copy_to_directory(entries, path, destination.overwrite()),
        TaskOutput::Stream(sink) => copy_to_stream(entries, sink),
    }
}

/// Single-file destination: exactly one accumulated entry is required
fn copy_to_file(entries: &mut Vec<PopulatedFileOutput>, target: &Path, overwrite: bool) -> Result<()> {
    if target.exists() && !target.is_file() {
        return Err(OutputError::NotAFile {
            path: target.to_path_buf(),
        }
        .into());
    }
    if entries.len() != 1 {
        return Err(OutputError::SingleOutputExpected {
            count: entries.len(),
            path: target.to_path_buf(),
        }
        .into());
    }
    let entry = entries.remove(0);
    copy_and_delete(entry, target, overwrite)
}

/// Directory destination: one file per entry, under its generated name
fn copy_to_directory(
    entries: &mut Vec<PopulatedFileOutput>,
    target: &Path,
    overwrite: bool,
) -> Result<()> {
    if target.exists() && !target.is_dir() {
        return Err(OutputError::NotADirectory {
            path: target.to_path_buf(),
        }
        .into());
    }
    if !target.exists() {
        fs::create_dir_all(target).map_err(|e| OutputError::CreateDirectory {
            path: target.to_path_buf(),
            reason: e.to_string(),
        })?;
    }
    while !entries.is_empty() {
        let entry = entries.remove(0);
        if let Err(e) = check_name(&entry) {
            delete_temp(entry.temp_path());
            return Err(e);
        }
        let file_target = target.join(entry.name());
        copy_and_delete(entry, &file_target, overwrite)?;
    }
    Ok(())
}

/// Stream destination: one zip archive with one entry per output
///
/// The zip writer needs `Seek`, so the archive is spooled to an anonymous
/// temp file and copied to the sink once finished.
fn copy_to_stream(entries: &mut Vec<PopulatedFileOutput>, sink: &StreamSink) -> Result<()> {
    let spool = tempfile::tempfile().map_err(|e| OutputError::TempBuffer {
        reason: e.to_string(),
    })?;
    let mut archive = zip::ZipWriter::new(spool);
    let options = zip::write::FileOptions::default();
    let mut seen_names: HashSet<String> = HashSet::new();

    while !entries.is_empty() {
        let entry = entries.remove(0);
        let appended = append_archive_entry(&mut archive, &entry, options, &mut seen_names);
        delete_temp(entry.temp_path());
        appended?;
    }

    let mut spool = archive.finish().map_err(|e| OutputError::Stream {
        reason: e.to_string(),
    })?;
    spool
        .seek(SeekFrom::Start(0))
        .map_err(|e| OutputError::Stream {
            reason: e.to_string(),
        })?;
    sink.with_writer(|writer| {
        std::io::copy(&mut spool, writer)?;
        writer.flush()
    })
    .map_err(|e| OutputError::Stream {
        reason: e.to_string(),
    })?;
    Ok(())
}

fn append_archive_entry<W: Write + Seek>(
    archive: &mut zip::ZipWriter<W>,
    entry: &PopulatedFileOutput,
    options: zip::write::FileOptions,
    seen_names: &mut HashSet<String>,
) -> Result<()> {
    check_name(entry)?;
    if !seen_names.insert(entry.name().to_string()) {
        return Err(OutputError::DuplicateEntryName {
            name: entry.name().to_string(),
        }
        .into());
    }
    debug!(temp = %entry.temp_path().display(), name = %entry.name(), "adding zip entry");
    archive
        .start_file(entry.name(), options)
        .map_err(|e| OutputError::Archive {
            name: entry.name().to_string(),
            reason: e.to_string(),
        })?;
    let mut input = fs::File::open(entry.temp_path()).map_err(|e| OutputError::Archive {
        name: entry.name().to_string(),
        reason: e.to_string(),
    })?;
    std::io::copy(&mut input, archive).map_err(|e| OutputError::Archive {
        name: entry.name().to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Copy one temp file to its target, deleting the temp file on every path
fn copy_and_delete(entry: PopulatedFileOutput, target: &Path, overwrite: bool) -> Result<()> {
    let result = copy_file(entry.temp_path(), target, overwrite);
    delete_temp(entry.temp_path());
    result
}

fn copy_file(from: &Path, to: &Path, overwrite: bool) -> Result<()> {
    if to.exists() && !overwrite {
        return Err(OutputError::AlreadyExists {
            path: to.to_path_buf(),
        }
        .into());
    }
    if let Some(parent) = to.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| OutputError::CreateDirectory {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
    }
    debug!(from = %from.display(), to = %to.display(), "copying output");
    fs::copy(from, to).map_err(|e| OutputError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Blank names and names that could escape the destination fail the flush
fn check_name(entry: &PopulatedFileOutput) -> Result<()> {
    let name = entry.name();
    if name.trim().is_empty() {
        return Err(OutputError::MissingName {
            temp: entry.temp_path().to_path_buf(),
        }
        .into());
    }
    if name == ".." || name.contains('/') || name.contains('\\') {
        return Err(OutputError::UnsafeName {
            name: name.to_string(),
        }
        .into());
    }
    Ok(())
}

/// Best-effort temp file removal; a missing file is not a failure
fn delete_temp(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "unable to delete temporary file");
        }
    }
}

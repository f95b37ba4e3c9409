//! Publishing output files without exposing partial writes.
//!
//! Every output is first written to a hidden temporary file next to the
//! destination, then renamed over it. A failed encode or conversion leaves
//! the destination exactly as it was; the temporary file is removed when
//! its handle drops.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// True for existing destinations that are not regular files (`/dev/null`, FIFOs).
fn is_special(destination: &Path) -> bool {
    fs::metadata(destination).is_ok_and(|meta| !meta.is_file())
}

/// Create an empty staging file in the destination's directory.
///
/// `suffix` matters to external encoders that pick their output format from
/// the file extension. Special destinations are staged in the system temp
/// directory instead.
pub fn staging_file(destination: &Path, suffix: &str) -> io::Result<NamedTempFile> {
    let builder = {
        let mut builder = tempfile::Builder::new();
        builder.prefix(".imgfit-").suffix(suffix);
        builder
    };
    if is_special(destination) {
        return builder.tempfile();
    }
    let dir = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    builder.tempfile_in(dir)
}

/// Move a fully written staging file onto `destination`.
///
/// Special files such as `/dev/null` are written through rather than
/// replaced.
pub fn publish(staged: NamedTempFile, destination: &Path) -> io::Result<()> {
    if is_special(destination) {
        let mut target = OpenOptions::new().write(true).open(destination)?;
        io::copy(&mut File::open(staged.path())?, &mut target)?;
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))?;
    }

    staged.persist(destination).map_err(|e| e.error)?;
    Ok(())
}

/// Stage, write with `write`, then publish to `destination`.
pub fn write_atomically<E>(
    destination: &Path,
    suffix: &str,
    write: impl FnOnce(&mut dyn Write) -> Result<(), E>,
) -> Result<(), E>
where
    E: From<io::Error>,
{
    let mut staged = staging_file(destination, suffix)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    publish(staged, destination)?;
    Ok(())
}

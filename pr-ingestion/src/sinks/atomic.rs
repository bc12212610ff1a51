use std::path::Path;

use anyhow::Context;

/// Writes `target` by letting `write` fill a temporary sibling file, then
/// renaming it into place. On any failure the temporary file is removed and
/// an existing `target` is left untouched.
///
/// The temporary file keeps `target`'s extension so encoders that pick a
/// format from the file name behave the same.
pub(crate) fn replace_via_temp<F>(target: &Path, write: F) -> anyhow::Result<()>
where
    F: FnOnce(&Path) -> anyhow::Result<()>,
{
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let suffix = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let tmp = tempfile::Builder::new()
        .prefix(".pr-report-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?
        .into_temp_path();

    write(&tmp)?;

    tmp.persist(target)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to move output into {}", target.display()))?;
    Ok(())
}

use super::{single_error, ErrorSet, KernelImage, KernelScan};
use crate::config::KernelsConfig;
use std::ffi::OsString;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

pub async fn scan_kernels(cfg: &KernelsConfig) -> Result<KernelScan, ErrorSet> {
    let list_context = format!("list {}", cfg.dir.display());

    let mut entries = match tokio::fs::read_dir(&cfg.dir).await {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %cfg.dir.display(), error = %err, "kernel directory listing failed");
            return Err(single_error(list_context, err));
        }
    };

    let mut scan = KernelScan::default();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                warn!(dir = %cfg.dir.display(), error = %err, "kernel directory listing aborted");
                scan.errors.insert(list_context, err.into());
                break;
            }
        };

        let name = entry.file_name();
        if !cfg.matches(&name.to_string_lossy()) {
            continue;
        }

        // DirEntry::metadata does not traverse symlinks.
        let meta = entry.metadata().await;
        record_entry(&mut scan, cfg, &entry.path(), name, meta);
    }

    Ok(scan)
}

// A failed stat is recorded against the entry and never stops the scan.
fn record_entry(
    scan: &mut KernelScan,
    cfg: &KernelsConfig,
    path: &Path,
    name: OsString,
    meta: io::Result<Metadata>,
) {
    let timestamps = meta.and_then(|meta| {
        let mtime = meta.modified()?;
        let ctime = if cfg.track_creation_time {
            meta.created().ok()
        } else {
            None
        };
        Ok((mtime, ctime))
    });
    let (mtime, ctime) = match timestamps {
        Ok(timestamps) => timestamps,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "kernel image stat failed");
            scan.errors.insert(format!("stat {}", path.display()), err.into());
            return;
        }
    };

    debug!(kernel = ?name, has_ctime = ctime.is_some(), "kernel image found");
    scan.kernels
        .insert(name.clone(), KernelImage { name, mtime, ctime });
}

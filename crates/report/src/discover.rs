//! Result file discovery and classification.
//!
//! Files are located by filename substring matching inside the results
//! directory: the name must carry a phase tag (`pre_` / `post_`) and a
//! kind tag. JSON files hold ping/iperf/dns/transfer results; the YABS
//! system benchmark arrives as a `.txt` report.

use perfdelta_core::{CompareError, Kind, Phase, Result, TransferTool};
use std::path::{Path, PathBuf};

/// A classified result file awaiting normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    /// Absolute or caller-relative path to the file.
    pub path: PathBuf,
    /// Phase tag found in the filename.
    pub phase: Phase,
    /// Kind tag found in the filename.
    pub kind: Kind,
}

/// Classify a bare filename into (phase, kind).
///
/// Returns `None` for files carrying no phase tag or no recognized kind
/// tag; such files are ignored, not errors. The kind tags are checked in
/// the same precedence order as the original tooling: ping, iperf, dns,
/// then the transfer tools. `.txt` files only ever match YABS.
pub fn classify(file_name: &str) -> Option<(Phase, Kind)> {
    let phase = if file_name.contains(Phase::Pre.tag()) {
        Phase::Pre
    } else if file_name.contains(Phase::Post.tag()) {
        Phase::Post
    } else {
        return None;
    };

    if let Some(stem) = file_name.strip_suffix(".json") {
        let kind = if stem.contains("ping") {
            Kind::Ping
        } else if stem.contains("iperf") {
            Kind::Iperf
        } else if stem.contains("dns") {
            Kind::Dns
        } else if let Some(tool) = TransferTool::ALL
            .iter()
            .find(|tool| stem.contains(tool.as_str()))
        {
            Kind::Transfer(*tool)
        } else {
            return None;
        };
        return Some((phase, kind));
    }

    if let Some(stem) = file_name.strip_suffix(".txt") {
        if stem.contains("yabs") {
            return Some((phase, Kind::Yabs));
        }
    }

    None
}

/// Find all classifiable result files in `dir`, in lexicographic
/// filename order.
///
/// The ordering makes the last-one-wins overwrite for duplicate
/// (phase, kind) pairs deterministic.
pub fn discover(dir: &Path) -> Result<Vec<ResultFile>> {
    let entries = std::fs::read_dir(dir).map_err(|source| CompareError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CompareError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some((phase, kind)) = classify(name) {
            files.push(ResultFile { path, phase, kind });
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

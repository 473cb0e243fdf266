//! Filesystem side of the pipeline: loading result files into a
//! session and writing the rendered outputs.

use crate::discover::{self, ResultFile};
use crate::{csv, normalize, svg};
use perfdelta_core::{CompareError, ComparisonSession, Kind, Result, UniformRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default name of the chart output directory inside the results dir.
pub const VISUALIZATIONS_DIR: &str = "visualizations";

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| CompareError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Normalize a single classified result file.
pub fn load_record(file: &ResultFile) -> Result<UniformRecord> {
    let content = read_file(&file.path)?;
    let record = match file.kind {
        Kind::Yabs => normalize::normalize_yabs(&content),
        json_kind => {
            let data: serde_json::Value =
                serde_json::from_str(&content).map_err(|source| CompareError::Json {
                    path: file.path.clone(),
                    source,
                })?;
            match json_kind {
                Kind::Ping => normalize::normalize_ping(&data),
                Kind::Iperf => normalize::normalize_iperf(&data),
                Kind::Dns => normalize::normalize_dns(&data),
                Kind::Transfer(tool) => normalize::normalize_transfer(&data, tool),
                Kind::Yabs => unreachable!("handled above"),
            }
        }
    };
    Ok(record)
}

/// Discover, decode and normalize every result file in `results_dir`.
///
/// Undecodable JSON is logged and skipped so one corrupt file does not
/// abort the run; unreadable files are hard errors. Duplicate
/// (phase, kind) pairs resolve last-one-wins in lexicographic filename
/// order.
pub fn load_session(results_dir: &Path) -> Result<ComparisonSession> {
    if !results_dir.is_dir() {
        return Err(CompareError::ResultsDirMissing {
            path: results_dir.to_path_buf(),
        });
    }

    let mut session = ComparisonSession::new();
    for file in discover::discover(results_dir)? {
        match load_record(&file) {
            Ok(record) => {
                debug!(path = %file.path.display(), phase = %file.phase, kind = %record.kind, "normalized result file");
                session.insert(file.phase, record);
            }
            Err(CompareError::Json { path, source }) => {
                warn!(path = %path.display(), error = %source, "skipping undecodable result file");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(session)
}

/// Render the comparison CSV and write it to `path`.
pub fn write_csv(session: &ComparisonSession, path: &Path) -> Result<()> {
    let table = csv::export_csv(session);
    fs::write(path, table).map_err(|source| CompareError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "comparison CSV written");
    Ok(())
}

/// Render every applicable chart into `out_dir` and return the written
/// paths.
///
/// Charts follow the per-kind presence rule: a comparison chart is only
/// emitted when the records it needs exist.
pub fn write_charts(session: &ComparisonSession, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).map_err(|source| CompareError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for (name, rendered) in svg::render_all(session) {
        let path = out_dir.join(format!("{name}.svg"));
        fs::write(&path, rendered).map_err(|source| CompareError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "chart written");
        written.push(path);
    }
    Ok(written)
}

/// Default chart directory for a results directory.
pub fn default_charts_dir(results_dir: &Path) -> PathBuf {
    results_dir.join(VISUALIZATIONS_DIR)
}

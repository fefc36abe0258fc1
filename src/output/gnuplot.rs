//! Gnuplot script generation for trace files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SeoError};

/// Build a gnuplot script plotting columns `2..` of `data_file` as step
/// series, one per label.
pub fn gnuplot_script<S: AsRef<str>>(data_file: &str, labels: &[S]) -> Result<String> {
    if labels.is_empty() {
        return Err(SeoError::invalid_parameter("labels", "at least one series is required"));
    }
    for (index, label) in labels.iter().enumerate() {
        if label.as_ref().is_empty() {
            return Err(SeoError::InvalidLabel {
                index,
                message: "label is empty".to_string(),
            });
        }
    }

    let series: Vec<String> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            format!(
                "'{data_file}' u 1:{} title '{}' w steps lw 3",
                i + 2,
                label.as_ref()
            )
        })
        .collect();

    let mut script = String::new();
    script.push_str("#unset key\n");
    script.push_str("#set title 'no'\n");
    script.push_str("set terminal qt font \"Arial,10\"\n");
    script.push_str("set xl 't[ns]'\n");
    script.push_str("set yl 'V[V]'\n");
    script.push('\n');
    script.push_str("p ");
    script.push_str(&series.join(",\\\n  "));
    script.push('\n');
    Ok(script)
}

/// Path of the script for a data file: `<stem>_gnu.txt` in the same directory.
pub fn script_path(data_path: &Path) -> PathBuf {
    let stem = data_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    data_path.with_file_name(format!("{stem}_gnu.txt"))
}

/// Write the script next to `data_path` and return its path.
pub fn write_gnuplot_script<S: AsRef<str>>(data_path: &Path, labels: &[S]) -> Result<PathBuf> {
    let script = gnuplot_script(&data_path.display().to_string(), labels)?;
    let path = script_path(data_path);
    fs::write(&path, script)
        .map_err(|e| SeoError::io(format!("gnuplot script {}", path.display()), e))?;
    log::info!("gnuplot script generated: {}", path.display());
    Ok(path)
}

use std::fs;
use std::path::{Path, PathBuf};

use sc_core::ScriptError;
use walkdir::WalkDir;

use crate::{map_cli_source_path, map_cli_source_read, map_cli_source_scan};

pub(crate) const SCRIPT_SUFFIX: &str = ".cutscene.xml";

/// One cutscene document found on disk. `name` is the file name with the
/// `.cutscene.xml` suffix stripped; play-script references resolve to it.
#[derive(Debug, Clone)]
pub(crate) struct ScriptFile {
    pub(crate) name: String,
    pub(crate) relative: String,
    pub(crate) path: PathBuf,
}

pub(crate) fn resolve_scripts_dir(scripts_dir: &str) -> Result<PathBuf, ScriptError> {
    let path = PathBuf::from(scripts_dir);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_source_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(ScriptError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("scripts-dir does not exist: {}", absolute.display()),
        ));
    }

    if !absolute.is_dir() {
        return Err(ScriptError::new(
            "CLI_SOURCE_NOT_DIR",
            format!("scripts-dir is not a directory: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

/// Every `.cutscene.xml` under `scripts_dir`, sorted by relative path.
pub(crate) fn list_script_files(scripts_dir: &Path) -> Result<Vec<ScriptFile>, ScriptError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(scripts_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(name) = script_name(path) else {
            continue;
        };

        let relative = path
            .strip_prefix(scripts_dir)
            .map_err(map_cli_source_scan)?
            .to_string_lossy()
            .replace('\\', "/");

        files.push(ScriptFile {
            name,
            relative,
            path: path.to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

/// Library name for a script path; `None` when the suffix does not match.
pub(crate) fn script_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.strip_suffix(SCRIPT_SUFFIX)?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

pub(crate) fn read_script_source(path: &Path) -> Result<String, ScriptError> {
    fs::read_to_string(path).map_err(map_cli_source_read)
}

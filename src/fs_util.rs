use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::NcbiDataError;

pub fn gunzip(path: &Path) -> Result<PathBuf, NcbiDataError> {
    let target = path
        .to_str()
        .and_then(|value| value.strip_suffix(".gz"))
        .map(PathBuf::from)
        .ok_or_else(|| {
            NcbiDataError::Filesystem(format!("not a .gz file: {}", path.display()))
        })?;
    let parent = target
        .parent()
        .ok_or_else(|| NcbiDataError::Filesystem("invalid destination path".to_string()))?;

    let file = fs::File::open(path)
        .map_err(|err| NcbiDataError::Filesystem(format!("open {}: {err}", path.display())))?;
    let mut decoder = GzDecoder::new(io::BufReader::new(file));
    let mut temp = tempfile::Builder::new()
        .prefix(".kira-ncbi-data")
        .tempfile_in(parent)
        .map_err(|err| NcbiDataError::Filesystem(err.to_string()))?;
    io::copy(&mut decoder, temp.as_file_mut())
        .map_err(|err| NcbiDataError::Filesystem(format!("gunzip {}: {err}", path.display())))?;
    temp.persist(&target)
        .map_err(|err| NcbiDataError::Filesystem(err.to_string()))?;
    fs::remove_file(path).map_err(|err| NcbiDataError::Filesystem(err.to_string()))?;
    Ok(target)
}

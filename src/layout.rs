use std::fs;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::domain::TaxId;
use crate::error::NcbiDataError;

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: Utf8PathBuf,
}

impl OutputLayout {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn report_path(&self, taxid: &TaxId) -> Utf8PathBuf {
        self.root
            .join(format!("ncbi_assembly_report_{}.csv", taxid.as_str()))
    }

    pub fn download_summary_path(&self, taxid: &TaxId) -> Utf8PathBuf {
        self.root
            .join(format!("ncbi_genome_download_summary_{}.csv", taxid.as_str()))
    }

    pub fn accession_dir(&self, accession: &str) -> Utf8PathBuf {
        self.root.join(accession)
    }

    pub fn ensure_root(&self) -> Result<(), NcbiDataError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| NcbiDataError::Filesystem(format!("{}: {err}", self.root)))
    }

    pub fn ensure_accession_dir(&self, accession: &str) -> Result<Utf8PathBuf, NcbiDataError> {
        if !is_accession_dir_name(accession) {
            return Err(NcbiDataError::Filesystem(format!(
                "refusing accession directory name {accession:?}"
            )));
        }
        let dir = self.accession_dir(accession);
        fs::create_dir_all(dir.as_std_path())
            .map_err(|err| NcbiDataError::Filesystem(format!("{dir}: {err}")))?;
        Ok(dir)
    }
}

pub fn is_accession_dir_name(name: &str) -> bool {
    let mut components = Utf8Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Utf8Component::Normal(_)), None)
    )
}

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{Span, info, info_span, warn};

use crate::domain::FileKind;
use crate::error::NcbiDataError;
use crate::fs_util;
use crate::ftp::FileTransport;
use crate::layout::{OutputLayout, is_accession_dir_name};

#[derive(Debug, Clone)]
pub struct RetrievedFile {
    pub kind: FileKind,
    pub local_path: PathBuf,
    pub present: bool,
}

#[derive(Debug, Clone)]
pub struct AccessionDownload {
    pub accession: String,
    pub remote_base_path: String,
    pub files: Vec<RetrievedFile>,
}

impl AccessionDownload {
    pub fn downloaded_files(&self) -> usize {
        self.files.iter().filter(|file| file.present).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DownloadSummary {
    pub entries: Vec<AccessionDownload>,
}

impl DownloadSummary {
    pub fn write_csv(&self, path: &Path) -> Result<(), NcbiDataError> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|err| NcbiDataError::Csv(format!("{}: {err}", path.display())))?;
        writer
            .write_record(["accession", "downloaded_files"])
            .map_err(|err| NcbiDataError::Csv(err.to_string()))?;
        for entry in &self.entries {
            writer
                .write_record([entry.accession.clone(), entry.downloaded_files().to_string()])
                .map_err(|err| NcbiDataError::Csv(err.to_string()))?;
        }
        writer
            .flush()
            .map_err(|err| NcbiDataError::Filesystem(err.to_string()))
    }
}

pub struct FileRetriever<'a, T: FileTransport> {
    transport: &'a T,
    layout: &'a OutputLayout,
    decompress: bool,
    span: Span,
}

impl<'a, T: FileTransport> FileRetriever<'a, T> {
    pub fn new(transport: &'a T, layout: &'a OutputLayout, parent: &Span) -> Self {
        Self {
            transport,
            layout,
            decompress: false,
            span: info_span!(parent: parent, "retrieve"),
        }
    }

    pub fn with_decompress(mut self, decompress: bool) -> Self {
        self.decompress = decompress;
        self
    }

    pub fn retrieve<S: AsRef<str>>(
        &self,
        table: &Path,
        kinds: &[S],
    ) -> Result<DownloadSummary, NcbiDataError> {
        let kinds = FileKind::parse_list(kinds)?;
        let paths = read_remote_paths(table)?;
        self.retrieve_paths(&paths, &kinds)
    }

    pub fn retrieve_paths(
        &self,
        remote_paths: &[String],
        kinds: &[FileKind],
    ) -> Result<DownloadSummary, NcbiDataError> {
        let _entered = self.span.enter();
        self.layout.ensure_root()?;
        let mut summary = DownloadSummary::default();
        for remote_path in remote_paths {
            let accession = accession_from_remote_path(remote_path);
            if !is_accession_dir_name(&accession) {
                warn!(remote_path = %remote_path, "no accession in remote path, skipping");
                continue;
            }
            info!(remote_path = %remote_path, "downloading files");
            summary
                .entries
                .push(self.retrieve_one(remote_path, accession, kinds)?);
        }
        Ok(summary)
    }

    fn retrieve_one(
        &self,
        remote_path: &str,
        accession: String,
        kinds: &[FileKind],
    ) -> Result<AccessionDownload, NcbiDataError> {
        let base = remote_path.trim_end_matches('/');
        let basename = remote_basename(base);
        let dir = self.layout.ensure_accession_dir(&accession)?;

        let mut files = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let url = format!("{base}/{basename}{}", kind.remote_suffix());
            let mut local_path = dir
                .as_std_path()
                .join(format!("{accession}{}", kind.local_suffix()));
            if let Err(err) = self.transport.download(&url, &local_path) {
                warn!(url = %url, error = %err, "file transfer failed");
            }
            let mut present = local_path.exists();
            if present && self.decompress {
                match fs_util::gunzip(&local_path) {
                    Ok(plain) => local_path = plain,
                    Err(err) => warn!(path = %local_path.display(), error = %err, "decompression failed"),
                }
                present = local_path.exists();
            }
            files.push(RetrievedFile {
                kind: *kind,
                local_path,
                present,
            });
        }

        let download = AccessionDownload {
            accession,
            remote_base_path: remote_path.to_string(),
            files,
        };
        info!(
            accession = %download.accession,
            downloaded = download.downloaded_files(),
            requested = kinds.len(),
            "accession files retrieved"
        );
        Ok(download)
    }
}

fn remote_basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn accession_from_remote_path(path: &str) -> String {
    remote_basename(path.trim_end_matches('/'))
        .split('_')
        .take(2)
        .collect::<Vec<_>>()
        .join("_")
}

pub fn read_remote_paths(table: &Path) -> Result<Vec<String>, NcbiDataError> {
    let content = fs::read_to_string(table)
        .map_err(|err| NcbiDataError::Filesystem(format!("{}: {err}", table.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|err| NcbiDataError::Csv(err.to_string()))?
        .clone();

    if headers.len() <= 1 {
        return Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("ftp://"))
            .map(str::to_string)
            .collect());
    }

    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| NcbiDataError::InvalidTable(format!("missing column {name}")))
    };
    let has_annotation = column("has_annotation")?;
    let refseq = column("FtpPath_RefSeq")?;
    let genbank = column("FtpPath_GenBank")?;
    let accession = headers
        .iter()
        .position(|header| header == "AssemblyAccession");

    let mut paths = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| NcbiDataError::Csv(err.to_string()))?;
        let field = |index: usize| record.get(index).map(str::trim).unwrap_or("");
        if !field(has_annotation).eq_ignore_ascii_case("true") {
            continue;
        }
        if !field(refseq).is_empty() {
            paths.push(field(refseq).to_string());
        } else if !field(genbank).is_empty() {
            paths.push(field(genbank).to_string());
        } else {
            let name = accession.map(field).unwrap_or("");
            warn!(accession = %name, "genome data not found");
        }
    }
    Ok(paths)
}

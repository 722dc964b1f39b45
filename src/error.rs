use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum NcbiDataError {
    #[error("invalid taxonomy id: {0}")]
    InvalidTaxid(String),

    #[error("invalid file kind: {0} (expected one of gbk, fna, faa, gff, transcript_fna)")]
    InvalidFileKind(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("missing taxonomy id (pass --tax-id or set taxid in the config file)")]
    MissingTaxid,

    #[error("NCBI Datasets request failed: {0}")]
    NcbiHttp(String),

    #[error("NCBI Datasets returned status {status}: {message}")]
    NcbiStatus { status: u16, message: String },

    #[error("E-utilities request failed: {0}")]
    EutilsHttp(String),

    #[error("E-utilities returned status {status}: {message}")]
    EutilsStatus { status: u16, message: String },

    #[error("no summary document returned for {db} id {id}")]
    SummaryMissing { db: String, id: String },

    #[error("file transfer failed: {0}")]
    TransferHttp(String),

    #[error("file server returned status {status} for {url}")]
    TransferStatus { status: u16, url: String },

    #[error("{operation} for {subject} failed after {attempts} attempts: {last_error}")]
    #[diagnostic(help("NCBI is rate limiting or unavailable; retry later or set NCBI_API_KEY"))]
    RetriesExhausted {
        operation: String,
        subject: String,
        attempts: usize,
        last_error: String,
    },

    #[error("invalid input table: {0}")]
    InvalidTable(String),

    #[error("csv error: {0}")]
    Csv(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl NcbiDataError {
    pub fn status(&self) -> Option<u16> {
        match self {
            NcbiDataError::NcbiStatus { status, .. }
            | NcbiDataError::EutilsStatus { status, .. }
            | NcbiDataError::TransferStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::NcbiDataError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaxId(String);

impl TaxId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaxId {
    type Err = NcbiDataError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        let is_valid = !normalized.is_empty() && normalized.chars().all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(NcbiDataError::InvalidTaxid(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblySource {
    RefSeq,
    GenBank,
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssemblyAccession(String);

impl AssemblyAccession {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn source(&self) -> AssemblySource {
        if self.0.starts_with("GCF_") {
            AssemblySource::RefSeq
        } else if self.0.starts_with("GCA_") {
            AssemblySource::GenBank
        } else {
            AssemblySource::Unrecognized
        }
    }
}

impl fmt::Display for AssemblyAccession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Gbk,
    Fna,
    Faa,
    Gff,
    #[value(name = "transcript_fna", alias = "transcript-fna")]
    TranscriptFna,
}

impl FileKind {
    pub const ALL: [FileKind; 5] = [
        FileKind::Gbk,
        FileKind::Fna,
        FileKind::Faa,
        FileKind::Gff,
        FileKind::TranscriptFna,
    ];

    pub fn remote_suffix(self) -> &'static str {
        match self {
            FileKind::Gbk => "_genomic.gbff.gz",
            FileKind::Faa => "_protein.faa.gz",
            FileKind::Fna => "_genomic.fna.gz",
            FileKind::TranscriptFna => "_cds_from_genomic.fna.gz",
            FileKind::Gff => "_genomic.gff.gz",
        }
    }

    pub fn local_suffix(self) -> &'static str {
        match self {
            FileKind::Gbk => "_genomic.gbk.gz",
            FileKind::Faa => "_protein.faa.gz",
            FileKind::Fna => "_genomic.fna.gz",
            FileKind::TranscriptFna => "_cds_from_genomic.fna.gz",
            FileKind::Gff => "_genomic.gff3.gz",
        }
    }

    pub fn parse_list<S: AsRef<str>>(values: &[S]) -> Result<Vec<FileKind>, NcbiDataError> {
        values.iter().map(|value| value.as_ref().parse()).collect()
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Gbk => write!(f, "gbk"),
            FileKind::Fna => write!(f, "fna"),
            FileKind::Faa => write!(f, "faa"),
            FileKind::Gff => write!(f, "gff"),
            FileKind::TranscriptFna => write!(f, "transcript_fna"),
        }
    }
}

impl FromStr for FileKind {
    type Err = NcbiDataError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "gbk" => Ok(FileKind::Gbk),
            "fna" => Ok(FileKind::Fna),
            "faa" => Ok(FileKind::Faa),
            "gff" => Ok(FileKind::Gff),
            "transcript_fna" | "transcript-fna" => Ok(FileKind::TranscriptFna),
            _ => Err(NcbiDataError::InvalidFileKind(value.to_string())),
        }
    }
}

use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::Deserialize;

use crate::discovery::DEFAULT_PAGE_SIZE;
use crate::domain::{FileKind, TaxId};
use crate::enrich::{Throttle, ThrottleSettings};
use crate::error::NcbiDataError;
use crate::retry::{RetryPolicy, RetrySettings};

pub const DEFAULT_OUTDIR: &str = "./outdir";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub taxid: Option<String>,
    #[serde(default)]
    pub download_files: Option<bool>,
    #[serde(default)]
    pub outdir: Option<String>,
    #[serde(default)]
    pub file_kinds: Option<Vec<String>>,
    #[serde(default)]
    pub decompress: Option<bool>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub throttle: ThrottleSettings,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub taxid: Option<String>,
    pub download_files: bool,
    pub outdir: Option<String>,
    pub file_kinds: Option<Vec<FileKind>>,
    pub decompress: bool,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub taxid: TaxId,
    pub download_files: bool,
    pub outdir: Utf8PathBuf,
    pub file_kinds: Vec<FileKind>,
    pub decompress: bool,
    pub page_size: u32,
    pub retry: RetryPolicy,
    pub throttle: Throttle,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, NcbiDataError> {
        let config = match path {
            Some(path) => Self::load(PathBuf::from(path))?,
            None => Config::default(),
        };
        Self::resolve_config(config, overrides)
    }

    pub fn load(path: PathBuf) -> Result<Config, NcbiDataError> {
        let content = fs::read_to_string(&path).map_err(|_| NcbiDataError::ConfigRead(path))?;
        serde_json::from_str(&content).map_err(|err| NcbiDataError::ConfigParse(err.to_string()))
    }

    pub fn resolve_config(
        config: Config,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, NcbiDataError> {
        let taxid = overrides
            .taxid
            .or(config.taxid)
            .ok_or(NcbiDataError::MissingTaxid)?
            .parse()?;

        let file_kinds = match (overrides.file_kinds, config.file_kinds) {
            (Some(kinds), _) if !kinds.is_empty() => kinds,
            (_, Some(kinds)) if !kinds.is_empty() => FileKind::parse_list(&kinds)?,
            _ => FileKind::ALL.to_vec(),
        };

        let outdir = overrides
            .outdir
            .or(config.outdir)
            .unwrap_or_else(|| DEFAULT_OUTDIR.to_string());

        Ok(ResolvedConfig {
            taxid,
            download_files: overrides.download_files || config.download_files.unwrap_or(false),
            outdir: Utf8PathBuf::from(outdir),
            file_kinds,
            decompress: overrides.decompress || config.decompress.unwrap_or(false),
            page_size: config.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
            retry: config.retry.into_policy(),
            throttle: config.throttle.into_throttle(),
        })
    }
}

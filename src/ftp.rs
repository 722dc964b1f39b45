use std::io;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tempfile::NamedTempFile;

use crate::error::NcbiDataError;

pub trait FileTransport: Send + Sync {
    fn download(&self, url: &str, destination: &Path) -> Result<(), NcbiDataError>;
}

#[derive(Clone)]
pub struct FtpHttpClient {
    client: Client,
}

impl FtpHttpClient {
    pub fn new() -> Result<Self, NcbiDataError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kira-ncbi-data/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| NcbiDataError::TransferHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|err| NcbiDataError::TransferHttp(err.to_string()))?;
        Ok(Self { client })
    }
}

impl FileTransport for FtpHttpClient {
    fn download(&self, url: &str, destination: &Path) -> Result<(), NcbiDataError> {
        let url = normalize_url(url);
        let mut response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| NcbiDataError::TransferHttp(err.to_string()))?;
        if !response.status().is_success() {
            return Err(NcbiDataError::TransferStatus {
                status: response.status().as_u16(),
                url,
            });
        }
        let parent = destination
            .parent()
            .ok_or_else(|| NcbiDataError::Filesystem("invalid destination path".to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix(".kira-ncbi-data")
            .tempfile_in(parent)
            .map_err(|err| NcbiDataError::Filesystem(err.to_string()))?;
        io::copy(&mut response, temp.as_file_mut())
            .map_err(|err| NcbiDataError::TransferHttp(err.to_string()))?;
        persist(temp, destination)
    }
}

fn persist(temp: NamedTempFile, destination: &Path) -> Result<(), NcbiDataError> {
    temp.persist(destination)
        .map_err(|err| NcbiDataError::Filesystem(err.to_string()))?;
    Ok(())
}

/// NCBI serves the FTP tree over HTTPS as well; reqwest only speaks HTTP.
pub fn normalize_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("ftp://ftp.ncbi.nlm.nih.gov/") {
        return format!("https://ftp.ncbi.nlm.nih.gov/{rest}");
    }
    url.to_string()
}

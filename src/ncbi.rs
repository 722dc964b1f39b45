use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::domain::TaxId;
use crate::error::NcbiDataError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetReportPage {
    #[serde(default)]
    pub reports: Vec<DatasetReport>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetReport {
    pub accession: String,
}

#[derive(Debug, Clone)]
pub struct TaxonReportQuery<'a> {
    pub taxid: &'a TaxId,
    pub page_size: u32,
    pub page_token: Option<&'a str>,
}

pub trait DatasetsClient: Send + Sync {
    fn taxon_dataset_report(
        &self,
        query: &TaxonReportQuery<'_>,
    ) -> Result<DatasetReportPage, NcbiDataError>;
}

#[derive(Clone)]
pub struct NcbiHttpClient {
    client: Client,
    base_url: String,
}

impl NcbiHttpClient {
    pub fn new() -> Result<Self, NcbiDataError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kira-ncbi-data/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| NcbiDataError::NcbiHttp(err.to_string()))?,
        );
        headers.insert("X-Datasets-Client", HeaderValue::from_static("kira-ncbi-data"));
        headers.insert(
            "X-Datasets-Client-Version",
            HeaderValue::from_str(env!("CARGO_PKG_VERSION"))
                .map_err(|err| NcbiDataError::NcbiHttp(err.to_string()))?,
        );

        if let Ok(api_key) = std::env::var("NCBI_API_KEY") {
            if !api_key.trim().is_empty() {
                headers.insert(
                    "api-key",
                    HeaderValue::from_str(api_key.trim())
                        .map_err(|err| NcbiDataError::NcbiHttp(err.to_string()))?,
                );
            }
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| NcbiDataError::NcbiHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: "https://api.ncbi.nlm.nih.gov/datasets/v2".to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, NcbiDataError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "NCBI request failed".to_string());
        Err(NcbiDataError::NcbiStatus { status, message })
    }
}

impl DatasetsClient for NcbiHttpClient {
    fn taxon_dataset_report(
        &self,
        query: &TaxonReportQuery<'_>,
    ) -> Result<DatasetReportPage, NcbiDataError> {
        let url = format!(
            "{}/genome/taxon/{}/dataset_report",
            self.base_url,
            query.taxid.as_str()
        );
        let params = taxon_report_params(query);
        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .map_err(|err| NcbiDataError::NcbiHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .json()
            .map_err(|err| NcbiDataError::NcbiHttp(err.to_string()))
    }
}

pub fn taxon_report_params(query: &TaxonReportQuery<'_>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("filters.assembly_source", "all".to_string()),
        ("filters.exclude_paired_reports", "true".to_string()),
        ("filters.assembly_version", "current".to_string()),
        ("page_size", query.page_size.to_string()),
    ];
    if let Some(token) = query.page_token {
        params.push(("page_token", token.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_params_include_filters_and_token() {
        let taxid: TaxId = "9606".parse().unwrap();
        let query = TaxonReportQuery {
            taxid: &taxid,
            page_size: 1000,
            page_token: Some("abc"),
        };
        let params = taxon_report_params(&query);
        assert!(params.contains(&("filters.exclude_paired_reports", "true".to_string())));
        assert!(params.contains(&("filters.assembly_version", "current".to_string())));
        assert!(params.contains(&("page_size", "1000".to_string())));
        assert!(params.contains(&("page_token", "abc".to_string())));
    }

    #[test]
    fn page_deserializes_without_token() {
        let page: DatasetReportPage = serde_json::from_str(
            r#"{"reports":[{"accession":"GCF_000001405.40","source_database":"SOURCE_DATABASE_REFSEQ"}],"total_count":1}"#,
        )
        .unwrap();
        assert_eq!(page.reports.len(), 1);
        assert_eq!(page.reports[0].accession, "GCF_000001405.40");
        assert!(page.next_page_token.is_none());
    }
}

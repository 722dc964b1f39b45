use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::NcbiDataError;

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const ESEARCH_RETMAX: &str = "1000";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    pub assembly_accession: String,
    pub organism: String,
    pub species_name: String,
    pub taxid: String,
    pub assembly_status: String,
    pub biosample_accn: String,
    pub biosample_id: String,
    pub bioproject_accn: String,
    pub coverage: String,
    pub contig_n50: String,
    pub refseq_category: String,
    pub partial_genome_representation: String,
    pub ftp_path_genbank: String,
    pub ftp_path_refseq: String,
    pub last_major_release_accession: String,
    pub last_update_date: String,
    pub submitter_organization: String,
    pub property_list: Vec<String>,
    pub meta: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SraSummary {
    pub runs: String,
    pub expxml: String,
}

pub trait EutilsClient: Send + Sync {
    fn esearch(&self, db: &str, term: &str) -> Result<Vec<String>, NcbiDataError>;
    fn assembly_summary(&self, id: &str) -> Result<AssemblySummary, NcbiDataError>;
    fn sra_summary(&self, id: &str) -> Result<SraSummary, NcbiDataError>;
}

#[derive(Clone)]
pub struct EutilsHttpClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    email: Option<String>,
}

impl EutilsHttpClient {
    pub fn new() -> Result<Self, NcbiDataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(format!("kira-ncbi-data/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| NcbiDataError::EutilsHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: EUTILS_BASE.to_string(),
            api_key: non_empty_env("NCBI_API_KEY"),
            email: non_empty_env("NCBI_EMAIL"),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn get_json(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, NcbiDataError> {
        let mut request = self
            .client
            .get(format!("{}/{endpoint}", self.base_url))
            .query(params)
            .query(&[("retmode", "json"), ("tool", "kira-ncbi-data")]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }
        if let Some(email) = &self.email {
            request = request.query(&[("email", email.as_str())]);
        }
        let response = request
            .send()
            .map_err(|err| NcbiDataError::EutilsHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "E-utilities request failed".to_string());
            return Err(NcbiDataError::EutilsStatus { status, message });
        }
        response
            .json()
            .map_err(|err| NcbiDataError::EutilsHttp(err.to_string()))
    }

    fn esummary(&self, db: &str, id: &str) -> Result<Value, NcbiDataError> {
        self.get_json("esummary.fcgi", &[("db", db), ("id", id)])
    }
}

impl EutilsClient for EutilsHttpClient {
    fn esearch(&self, db: &str, term: &str) -> Result<Vec<String>, NcbiDataError> {
        let payload = self.get_json(
            "esearch.fcgi",
            &[("db", db), ("term", term), ("retmax", ESEARCH_RETMAX)],
        )?;
        Ok(extract_id_list(&payload))
    }

    fn assembly_summary(&self, id: &str) -> Result<AssemblySummary, NcbiDataError> {
        let payload = self.esummary("assembly", id)?;
        let document = summary_document(&payload, "assembly", id)?;
        Ok(extract_assembly_summary(document))
    }

    fn sra_summary(&self, id: &str) -> Result<SraSummary, NcbiDataError> {
        let payload = self.esummary("sra", id)?;
        let document = summary_document(&payload, "sra", id)?;
        Ok(extract_sra_summary(document))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn extract_id_list(payload: &Value) -> Vec<String> {
    payload["esearchresult"]["idlist"]
        .as_array()
        .map(|list| list.iter().filter_map(scalar_text).collect())
        .unwrap_or_default()
}

pub fn summary_document<'a>(
    payload: &'a Value,
    db: &str,
    id: &str,
) -> Result<&'a Value, NcbiDataError> {
    payload["result"]
        .get(id)
        .filter(|document| document.is_object() && document.get("error").is_none())
        .ok_or_else(|| NcbiDataError::SummaryMissing {
            db: db.to_string(),
            id: id.to_string(),
        })
}

pub fn extract_assembly_summary(document: &Value) -> AssemblySummary {
    let text = |key: &str| document.get(key).and_then(scalar_text).unwrap_or_default();
    let bioproject_accn = document
        .get("gb_bioprojects")
        .and_then(Value::as_array)
        .and_then(|projects| projects.first())
        .and_then(|project| project.get("bioprojectaccn"))
        .and_then(scalar_text)
        .unwrap_or_default();
    let property_list = document
        .get("propertylist")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(scalar_text).collect())
        .unwrap_or_default();

    AssemblySummary {
        assembly_accession: text("assemblyaccession"),
        organism: text("organism"),
        species_name: text("speciesname"),
        taxid: text("taxid"),
        assembly_status: text("assemblystatus"),
        biosample_accn: text("biosampleaccn"),
        biosample_id: text("biosampleid"),
        bioproject_accn,
        coverage: text("coverage"),
        contig_n50: text("contign50"),
        refseq_category: text("refseq_category"),
        partial_genome_representation: text("partialgenomerepresentation"),
        ftp_path_genbank: text("ftppath_genbank"),
        ftp_path_refseq: text("ftppath_refseq"),
        last_major_release_accession: text("lastmajorreleaseaccession"),
        last_update_date: text("lastupdatedate"),
        submitter_organization: text("submitterorganization"),
        property_list,
        meta: text("meta"),
    }
}

pub fn extract_sra_summary(document: &Value) -> SraSummary {
    let text = |key: &str| document.get(key).and_then(scalar_text).unwrap_or_default();
    SraSummary {
        runs: text("runs"),
        expxml: text("expxml"),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

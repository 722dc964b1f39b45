#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use kira_ncbi_data::error::NcbiDataError;
use kira_ncbi_data::eutils::{AssemblySummary, EutilsClient, SraSummary};
use kira_ncbi_data::ftp::FileTransport;
use kira_ncbi_data::ncbi::{DatasetReport, DatasetReportPage, DatasetsClient, TaxonReportQuery};
use kira_ncbi_data::retry::Sleeper;

#[derive(Default)]
pub struct NoSleep {
    pub pauses: Mutex<Vec<Duration>>,
}

impl NoSleep {
    pub fn total(&self) -> Duration {
        self.pauses.lock().unwrap().iter().sum()
    }
}

impl Sleeper for NoSleep {
    fn sleep(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

pub struct MockDatasets {
    pub accessions: Vec<String>,
}

impl DatasetsClient for MockDatasets {
    fn taxon_dataset_report(
        &self,
        _query: &TaxonReportQuery<'_>,
    ) -> Result<DatasetReportPage, NcbiDataError> {
        Ok(DatasetReportPage {
            reports: self
                .accessions
                .iter()
                .map(|accession| DatasetReport {
                    accession: accession.clone(),
                })
                .collect(),
            total_count: Some(self.accessions.len() as u64),
            next_page_token: None,
        })
    }
}

#[derive(Default)]
pub struct MockEutils {
    pub searches: HashMap<(String, String), Vec<String>>,
    pub assemblies: HashMap<String, AssemblySummary>,
    pub sra: HashMap<String, SraSummary>,
    /// Number of 429 responses to return before answering, keyed by call.
    pub rate_limits: Mutex<HashMap<String, usize>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockEutils {
    pub fn search(mut self, db: &str, term: &str, ids: &[&str]) -> Self {
        self.searches.insert(
            (db.to_string(), term.to_string()),
            ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    pub fn assembly(mut self, id: &str, summary: AssemblySummary) -> Self {
        self.assemblies.insert(id.to_string(), summary);
        self
    }

    pub fn sra_run(mut self, id: &str, runs: &str, expxml: &str) -> Self {
        self.sra.insert(
            id.to_string(),
            SraSummary {
                runs: runs.to_string(),
                expxml: expxml.to_string(),
            },
        );
        self
    }

    pub fn rate_limit(self, call: &str, times: usize) -> Self {
        self.rate_limits
            .lock()
            .unwrap()
            .insert(call.to_string(), times);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), NcbiDataError> {
        self.calls.lock().unwrap().push(call.clone());
        let mut limits = self.rate_limits.lock().unwrap();
        if let Some(remaining) = limits.get_mut(&call) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(NcbiDataError::EutilsStatus {
                    status: 429,
                    message: "API rate limit exceeded".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl EutilsClient for MockEutils {
    fn esearch(&self, db: &str, term: &str) -> Result<Vec<String>, NcbiDataError> {
        self.record(format!("esearch:{db}:{term}"))?;
        Ok(self
            .searches
            .get(&(db.to_string(), term.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn assembly_summary(&self, id: &str) -> Result<AssemblySummary, NcbiDataError> {
        self.record(format!("esummary:assembly:{id}"))?;
        self.assemblies
            .get(id)
            .cloned()
            .ok_or_else(|| NcbiDataError::SummaryMissing {
                db: "assembly".to_string(),
                id: id.to_string(),
            })
    }

    fn sra_summary(&self, id: &str) -> Result<SraSummary, NcbiDataError> {
        self.record(format!("esummary:sra:{id}"))?;
        self.sra
            .get(id)
            .cloned()
            .ok_or_else(|| NcbiDataError::SummaryMissing {
                db: "sra".to_string(),
                id: id.to_string(),
            })
    }
}

/// Serves `{dir}/{dir}{suffix}` for every suffix in `available`; fails for the rest.
#[derive(Default)]
pub struct MockTransport {
    pub available: Vec<String>,
    pub requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn serving(suffixes: &[&str]) -> Self {
        Self {
            available: suffixes.iter().map(|s| s.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl FileTransport for MockTransport {
    fn download(&self, url: &str, destination: &Path) -> Result<(), NcbiDataError> {
        self.requests.lock().unwrap().push(url.to_string());
        let mut segments = url.rsplit('/');
        let file = segments.next().unwrap_or_default();
        let dir = segments.next().unwrap_or_default();
        let served = file
            .strip_prefix(dir)
            .is_some_and(|suffix| self.available.iter().any(|s| s == suffix));
        if served {
            fs::write(destination, url.as_bytes())
                .map_err(|err| NcbiDataError::Filesystem(err.to_string()))
        } else {
            Err(NcbiDataError::TransferStatus {
                status: 550,
                url: url.to_string(),
            })
        }
    }
}

pub fn assembly(accession: &str, biosample: &str, properties: &[&str]) -> AssemblySummary {
    AssemblySummary {
        assembly_accession: accession.to_string(),
        organism: "Escherichia coli".to_string(),
        species_name: "Escherichia coli".to_string(),
        taxid: "562".to_string(),
        biosample_accn: biosample.to_string(),
        property_list: properties.iter().map(|p| p.to_string()).collect(),
        ..AssemblySummary::default()
    }
}

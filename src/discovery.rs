use tracing::{Span, info, info_span};

use crate::domain::{AssemblyAccession, AssemblySource, TaxId};
use crate::error::NcbiDataError;
use crate::ncbi::{DatasetsClient, TaxonReportQuery};
use crate::retry::Retrier;

pub const DEFAULT_PAGE_SIZE: u32 = 1000;

pub struct AccessionDiscovery<'a, C: DatasetsClient> {
    client: &'a C,
    retrier: &'a Retrier,
    page_size: u32,
    span: Span,
}

impl<'a, C: DatasetsClient> AccessionDiscovery<'a, C> {
    pub fn new(client: &'a C, retrier: &'a Retrier, page_size: u32, parent: &Span) -> Self {
        Self {
            client,
            retrier,
            page_size: page_size.max(1),
            span: info_span!(parent: parent, "discover"),
        }
    }

    pub fn discover(&self, taxid: &TaxId) -> Result<Vec<AssemblyAccession>, NcbiDataError> {
        let _entered = self.span.enter();
        let mut accessions = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page = 0usize;
        let mut reported_total = None;

        loop {
            page += 1;
            let query = TaxonReportQuery {
                taxid,
                page_size: self.page_size,
                page_token: page_token.as_deref(),
            };
            let subject = format!("taxon {taxid} page {page}");
            let report = self.retrier.run("dataset_report", &subject, || {
                self.client.taxon_dataset_report(&query)
            })?;
            reported_total = reported_total.or(report.total_count);

            for record in report.reports {
                let accession = AssemblyAccession::new(record.accession);
                if accession.source() == AssemblySource::Unrecognized {
                    info!(accession = %accession, "no GCF or GCA prefix");
                }
                accessions.push(accession);
            }

            match report.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        let gcf = count_source(&accessions, AssemblySource::RefSeq);
        let gca = count_source(&accessions, AssemblySource::GenBank);
        info!(
            taxid = %taxid,
            total = accessions.len(),
            reported = ?reported_total,
            gcf,
            gca,
            "assembly accessions discovered"
        );
        Ok(accessions)
    }
}

fn count_source(accessions: &[AssemblyAccession], source: AssemblySource) -> usize {
    accessions
        .iter()
        .filter(|accession| accession.source() == source)
        .count()
}

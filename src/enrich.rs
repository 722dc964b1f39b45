use std::time::Duration;

use serde::Deserialize;
use tracing::{Span, debug, info, info_span};

use crate::domain::AssemblyAccession;
use crate::error::NcbiDataError;
use crate::eutils::EutilsClient;
use crate::markup::{parse_platform, parse_run_accessions, parse_sequence_stats};
use crate::report::{AssemblyRecord, GenomeReport, ReportSink, SraLinkage};
use crate::retry::Retrier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throttle {
    pub every: usize,
    pub pause: Duration,
}

impl Default for Throttle {
    fn default() -> Self {
        Self {
            every: 100,
            pause: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThrottleSettings {
    #[serde(default)]
    pub every: Option<usize>,
    #[serde(default)]
    pub pause_secs: Option<u64>,
}

impl ThrottleSettings {
    pub fn into_throttle(self) -> Throttle {
        let defaults = Throttle::default();
        Throttle {
            every: self.every.unwrap_or(defaults.every),
            pause: self
                .pause_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.pause),
        }
    }
}

impl Throttle {
    pub fn pause_after(&self, index: usize) -> bool {
        self.every > 0 && index != 0 && index % self.every == 0
    }
}

pub struct EnrichmentPipeline<'a, E: EutilsClient> {
    client: &'a E,
    retrier: &'a Retrier,
    throttle: Throttle,
    span: Span,
}

impl<'a, E: EutilsClient> EnrichmentPipeline<'a, E> {
    pub fn new(client: &'a E, retrier: &'a Retrier, throttle: Throttle, parent: &Span) -> Self {
        Self {
            client,
            retrier,
            throttle,
            span: info_span!(parent: parent, "enrich"),
        }
    }

    pub fn enrich(&self, accessions: &[AssemblyAccession]) -> Result<GenomeReport, NcbiDataError> {
        let mut report = GenomeReport::default();
        self.enrich_into(accessions, &mut report)?;
        Ok(report)
    }

    /// The first unrecovered failure aborts the run; rows already pushed stay
    /// in the sink.
    pub fn enrich_into(
        &self,
        accessions: &[AssemblyAccession],
        sink: &mut dyn ReportSink,
    ) -> Result<usize, NcbiDataError> {
        let _entered = self.span.enter();
        let mut rows = 0usize;
        for (index, accession) in accessions.iter().enumerate() {
            let ids = self.resolve_ids(accession)?;
            if ids.is_empty() {
                debug!(accession = %accession, "no assembly ids found");
            }
            for id in &ids {
                info!(id = %id, accession = %accession, "writing assembly info");
                let record = self.build_record(id)?;
                sink.push(record)?;
                rows += 1;
            }
            if self.throttle.pause_after(index) {
                info!(processed = index + 1, "pausing between accession batches");
                self.retrier.sleeper().sleep(self.throttle.pause);
            }
        }
        Ok(rows)
    }

    pub fn resolve_ids(&self, accession: &AssemblyAccession) -> Result<Vec<String>, NcbiDataError> {
        self.retrier
            .run("esearch assembly", accession.as_str(), || {
                self.client.esearch("assembly", accession.as_str())
            })
    }

    pub fn build_record(&self, id: &str) -> Result<AssemblyRecord, NcbiDataError> {
        let summary = self
            .retrier
            .run("esummary assembly", id, || self.client.assembly_summary(id))?;
        let stats = parse_sequence_stats(&summary.meta);
        let linkage = if summary.biosample_accn.is_empty() {
            SraLinkage::default()
        } else {
            self.sra_linkage(&summary.biosample_accn)?
        };
        Ok(AssemblyRecord::new(summary, &stats, &linkage))
    }

    pub fn sra_linkage(&self, biosample_accn: &str) -> Result<SraLinkage, NcbiDataError> {
        let uids = self.retrier.run("esearch sra", biosample_accn, || {
            self.client.esearch("sra", biosample_accn)
        })?;
        let mut linkage = SraLinkage::default();
        for uid in &uids {
            let summary = self
                .retrier
                .run("esummary sra", uid, || self.client.sra_summary(uid))?;
            linkage.runs.extend(parse_run_accessions(&summary.runs));
            if let Some(platform) = parse_platform(&summary.expxml) {
                linkage.platforms.push(platform);
            }
        }
        Ok(linkage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_skips_first_accession() {
        let throttle = Throttle::default();
        assert!(!throttle.pause_after(0));
        assert!(!throttle.pause_after(99));
        assert!(throttle.pause_after(100));
        assert!(throttle.pause_after(200));

        let disabled = Throttle {
            every: 0,
            pause: Duration::ZERO,
        };
        assert!(!disabled.pause_after(100));
    }
}

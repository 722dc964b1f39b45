//! Extraction from the escaped XML fragments NCBI embeds in summary documents.
//!
//! Three shapes are understood:
//!
//! * assembly `meta`: a `<Stats>` block of
//!   `<Stat category="contig_count" sequence_tag="all">42</Stat>` elements.
//!   Attribute order is not fixed. Only `sequence_tag="all"` counts.
//! * sra `runs`: one or more self-closing `<Run acc="SRR..." .../>` elements.
//! * sra `expxml`: experiment description with a
//!   `<Platform instrument_model="...">ILLUMINA</Platform>` element.
//!
//! Anything that does not match is ignored; callers fall back to sentinels.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

pub const NOT_AVAILABLE: &str = "na";

pub const STAT_CATEGORIES: [&str; 6] = [
    "contig_count",
    "contig_l50",
    "scaffold_n50",
    "scaffold_count",
    "scaffold_l50",
    "total_length",
];

static STATS_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Stats\b[^>]*>(.*?)</Stats>").unwrap());
static STAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Stat\b([^>]*)>(.*?)</Stat>").unwrap());
static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z_][\w.-]*)\s*=\s*"([^"]*)""#).unwrap());
static RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<Run\s([^>]*?)/>").unwrap());
static RUN_ACC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\bacc="([^"]*)""#).unwrap());
static PLATFORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<Platform\b[^>]*>([^<]*)</Platform>").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceStats {
    values: BTreeMap<&'static str, String>,
}

impl SequenceStats {
    pub fn get(&self, category: &str) -> &str {
        self.values
            .get(category)
            .map(String::as_str)
            .unwrap_or(NOT_AVAILABLE)
    }
}

impl Default for SequenceStats {
    fn default() -> Self {
        Self {
            values: STAT_CATEGORIES
                .iter()
                .map(|category| (*category, NOT_AVAILABLE.to_string()))
                .collect(),
        }
    }
}

pub fn parse_sequence_stats(meta: &str) -> SequenceStats {
    let mut stats = SequenceStats::default();
    let Some(block) = STATS_BLOCK.captures(meta).and_then(|caps| caps.get(1)) else {
        return stats;
    };
    for caps in STAT.captures_iter(block.as_str()) {
        let attrs = parse_attributes(&caps[1]);
        if attrs.get("sequence_tag").map(String::as_str) != Some("all") {
            continue;
        }
        let Some(category) = attrs.get("category") else {
            continue;
        };
        if let Some(key) = STAT_CATEGORIES.iter().find(|key| **key == category.as_str()) {
            stats.values.insert(*key, caps[2].trim().to_string());
        }
    }
    stats
}

fn parse_attributes(raw: &str) -> BTreeMap<String, String> {
    ATTRIBUTE
        .captures_iter(raw)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

pub fn parse_run_accessions(runs: &str) -> Vec<String> {
    RUN.captures_iter(runs)
        .filter_map(|caps| {
            RUN_ACC
                .captures(&caps[1])
                .map(|acc| acc[1].to_string())
        })
        .collect()
}

pub fn parse_platform(expxml: &str) -> Option<String> {
    PLATFORM
        .captures(expxml)
        .map(|caps| caps[1].trim().to_string())
        .filter(|value| !value.is_empty())
}

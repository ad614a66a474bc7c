use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use crate::corpus::skill_list::parse_skill_list;
use crate::corpus::{Corpus, CorpusError, TrainingRecord};
use crate::matching::normalizer::AliasTable;

const SKILLS_COLUMN: &str = "Skills";
const ROLE_COLUMN: &str = "Role";
const DOMAIN_COLUMN: &str = "Domain";

/// Opens and parses the training CSV at `path`.
pub fn load_corpus(path: &Path, aliases: &AliasTable) -> Result<Corpus, CorpusError> {
    info!("Loading training corpus from {}", path.display());
    let corpus = read_corpus(File::open(path)?, aliases)?;
    info!(
        "Corpus loaded: {} rows read, {} duplicates removed, {} empty rows skipped, {} records kept",
        corpus.rows_read,
        corpus.duplicates_removed,
        corpus.empty_skipped,
        corpus.records.len()
    );
    Ok(corpus)
}

/// Parses corpus CSV from any reader.
///
/// Exact duplicate rows are dropped (first occurrence wins) before parsing.
/// An unparseable `Skills` cell fails the whole load; rows whose skill list
/// normalizes to nothing are skipped with a warning.
pub fn read_corpus<R: Read>(reader: R, aliases: &AliasTable) -> Result<Corpus, CorpusError> {
    let mut csv = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = csv.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(CorpusError::MissingColumn(name))
    };
    let skills_col = column(SKILLS_COLUMN)?;
    let role_col = column(ROLE_COLUMN)?;
    let domain_col = column(DOMAIN_COLUMN)?;

    let mut corpus = Corpus::default();
    let mut seen: HashSet<(String, String, String)> = HashSet::new();

    for row in csv.records() {
        let row = row?;
        corpus.rows_read += 1;
        let line = row
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(corpus.rows_read + 1);

        let raw_skills = row.get(skills_col).unwrap_or_default();
        let raw_role = row.get(role_col).unwrap_or_default();
        let raw_domain = row.get(domain_col).unwrap_or_default();

        let key = (
            raw_skills.to_string(),
            raw_role.to_string(),
            raw_domain.to_string(),
        );
        if !seen.insert(key) {
            corpus.duplicates_removed += 1;
            continue;
        }

        let parsed = parse_skill_list(raw_skills)
            .map_err(|message| CorpusError::Format { row: line, message })?;
        let skills: Vec<String> = aliases
            .normalize(&parsed)
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();

        if skills.is_empty() {
            warn!("Skipping corpus row {line}: no skills after normalization");
            corpus.empty_skipped += 1;
            continue;
        }

        let role = raw_role.trim();
        let domain = raw_domain.trim();
        if role.is_empty() || domain.is_empty() {
            return Err(CorpusError::Format {
                row: line,
                message: "Role and Domain must be non-empty".to_string(),
            });
        }

        corpus.records.push(TrainingRecord {
            skills,
            role: role.to_string(),
            domain: domain.to_string(),
        });
    }

    Ok(corpus)
}

//! Source loader: reads the seven snapshot documents from a local directory
//! or fetches them from a remote endpoint, and decodes them into a
//! `RawSnapshot`. Any failure here aborts the cycle.

pub mod cache;
pub mod local;
pub mod remote;

use crate::model::raw::{
    ConstituencyStatsDocument, PartyCandidateGroup, ProvinceDocument,
};
use crate::model::{Constituency, Party, RecordTable};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

pub use local::LocalSource;
pub use remote::RemoteSource;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("cannot read {document} from {path}: {source}")]
    Read {
        document: Document,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request for {document} at {url} failed: {source}")]
    Request {
        document: Document,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{document} at {url} returned HTTP {status}")]
    Status {
        document: Document,
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("malformed {document}: {source}")]
    Malformed {
        document: Document,
        #[source]
        source: serde_json::Error,
    },
    #[error("source not configured: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// The seven documents that make up one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Document {
    InfoProvince,
    InfoConstituency,
    InfoParty,
    InfoMpCandidate,
    InfoPartyCandidate,
    StatsCons,
    StatsParty,
}

impl Document {
    pub const ALL: [Document; 7] = [
        Document::InfoProvince,
        Document::InfoConstituency,
        Document::InfoParty,
        Document::InfoMpCandidate,
        Document::InfoPartyCandidate,
        Document::StatsCons,
        Document::StatsParty,
    ];

    /// Base name shared by the snapshot file and the remote endpoint.
    pub fn name(self) -> &'static str {
        match self {
            Document::InfoProvince => "info_province",
            Document::InfoConstituency => "info_constituency",
            Document::InfoParty => "info_party_overview",
            Document::InfoMpCandidate => "info_mp_candidate",
            Document::InfoPartyCandidate => "info_party_candidate",
            Document::StatsCons => "stats_cons",
            Document::StatsParty => "stats_party",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a cycle reads its documents from.
pub enum Source {
    Local(LocalSource),
    Remote(RemoteSource),
}

impl Source {
    pub async fn fetch(&mut self, document: Document) -> Result<Value> {
        match self {
            Source::Local(local) => local.fetch(document),
            Source::Remote(remote) => remote.fetch(document).await,
        }
    }

    /// Forget cached remote documents. No-op for a local source.
    pub fn invalidate(&mut self) {
        if let Source::Remote(remote) = self {
            remote.invalidate();
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Source::Local(local) => local.root().display().to_string(),
            Source::Remote(remote) => remote.base_url().to_string(),
        }
    }
}

/// Decoded documents of one ingestion cycle.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub provinces: ProvinceDocument,
    pub constituencies: Vec<Constituency>,
    pub parties: Vec<Party>,
    pub mp_candidates: RecordTable,
    pub party_candidates: Vec<PartyCandidateGroup>,
    pub stats_cons: ConstituencyStatsDocument,
    pub stats_party: Value,
    pub loaded_at: DateTime<Utc>,
}

/// Load and decode every document. The first failure is returned as-is.
pub async fn load_snapshot(source: &mut Source) -> Result<RawSnapshot> {
    tracing::debug!(source = %source.describe(), "loading snapshot");

    let provinces = decode(Document::InfoProvince, source.fetch(Document::InfoProvince).await?)?;
    let constituencies = decode(
        Document::InfoConstituency,
        source.fetch(Document::InfoConstituency).await?,
    )?;
    let parties = decode(Document::InfoParty, source.fetch(Document::InfoParty).await?)?;
    let mp_candidates = decode(
        Document::InfoMpCandidate,
        source.fetch(Document::InfoMpCandidate).await?,
    )?;
    let party_candidates = decode(
        Document::InfoPartyCandidate,
        source.fetch(Document::InfoPartyCandidate).await?,
    )?;
    let stats_cons = decode(Document::StatsCons, source.fetch(Document::StatsCons).await?)?;
    let stats_party = source.fetch(Document::StatsParty).await?;

    Ok(RawSnapshot {
        provinces,
        constituencies,
        parties,
        mp_candidates,
        party_candidates,
        stats_cons,
        stats_party,
        loaded_at: Utc::now(),
    })
}

fn decode<T: DeserializeOwned>(document: Document, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| SourceError::Malformed { document, source })
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_snapshot(dir: &std::path::Path) {
        for document in Document::ALL {
            let body = serde_json::to_string(&fixtures::document(document)).unwrap();
            fs::write(dir.join(document.file_name()), body).unwrap();
        }
    }

    #[tokio::test]
    async fn loads_complete_local_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        write_snapshot(dir.path());

        let mut source = Source::Local(LocalSource::new(dir.path()));
        let snapshot = load_snapshot(&mut source).await.unwrap();

        assert_eq!(snapshot.provinces.province.len(), 2);
        assert_eq!(snapshot.constituencies.len(), 3);
        assert_eq!(snapshot.parties.len(), 3);
        assert_eq!(snapshot.mp_candidates.len(), 6);
        assert_eq!(snapshot.party_candidates.len(), 2);
        assert_eq!(snapshot.stats_cons.result_province.len(), 2);
        assert!(snapshot.stats_party.get("result_party").is_some());
    }

    #[tokio::test]
    async fn missing_document_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        write_snapshot(dir.path());
        fs::remove_file(dir.path().join(Document::StatsCons.file_name())).unwrap();

        let mut source = Source::Local(LocalSource::new(dir.path()));
        let err = load_snapshot(&mut source).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Read { document: Document::StatsCons, .. }
        ));
    }

    #[tokio::test]
    async fn wrong_shape_is_reported_as_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write_snapshot(dir.path());
        fs::write(
            dir.path().join(Document::InfoConstituency.file_name()),
            r#"{"not": "an array"}"#,
        )
        .unwrap();

        let mut source = Source::Local(LocalSource::new(dir.path()));
        let err = load_snapshot(&mut source).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Malformed { document: Document::InfoConstituency, .. }
        ));
    }

    #[test]
    fn document_names_match_snapshot_files() {
        let names: Vec<_> = Document::ALL.iter().map(|d| d.file_name()).collect();
        assert_eq!(names[2], "info_party_overview.json");
        assert_eq!(names.len(), 7);
    }
}

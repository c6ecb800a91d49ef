//! Durable snapshot layout: three co-located JSON artifacts under a fixed
//! directory — the term-weighting model, the document-term matrix, and the
//! document list. They are only meaningful together, so `load` treats a
//! missing artifact as "no snapshot" and disagreeing artifacts as corruption.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::search::tfidf::{SparseVector, TfidfModel};
use crate::types::IndexedDocument;

const MODEL_FILE: &str = "model.json";
const MATRIX_FILE: &str = "matrix.json";
const DOCUMENTS_FILE: &str = "documents.json";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot artifacts disagree: {matrix_rows} matrix rows for {documents} documents")]
    Inconsistent {
        matrix_rows: usize,
        documents: usize,
    },
}

pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write all three artifacts. Each file lands via a temp-file rename so a
    /// torn write leaves either the old content or nothing parseable.
    pub fn save(
        &self,
        model: &TfidfModel,
        matrix: &[SparseVector],
        documents: &[IndexedDocument],
    ) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating snapshot dir {}", self.dir.display()))?;

        self.write_artifact(MODEL_FILE, model)?;
        self.write_artifact(MATRIX_FILE, &matrix)?;
        self.write_artifact(DOCUMENTS_FILE, &documents)?;

        tracing::debug!(dir = %self.dir.display(), documents = documents.len(), "snapshot saved");
        Ok(())
    }

    /// Load the snapshot. `Ok(None)` when any artifact is missing; an error
    /// when the files exist but are unreadable, unparseable, or inconsistent
    /// with each other. Callers treat both cases as "no index".
    pub fn load(&self) -> Result<Option<(TfidfModel, Vec<SparseVector>, Vec<IndexedDocument>)>> {
        let paths = [
            self.dir.join(MODEL_FILE),
            self.dir.join(MATRIX_FILE),
            self.dir.join(DOCUMENTS_FILE),
        ];
        if paths.iter().any(|p| !p.exists()) {
            return Ok(None);
        }

        let model: TfidfModel = self.read_artifact(&paths[0])?;
        let matrix: Vec<SparseVector> = self.read_artifact(&paths[1])?;
        let documents: Vec<IndexedDocument> = self.read_artifact(&paths[2])?;

        if matrix.len() != documents.len() {
            return Err(SnapshotError::Inconsistent {
                matrix_rows: matrix.len(),
                documents: documents.len(),
            }
            .into());
        }

        Ok(Some((model, matrix, documents)))
    }

    /// Remove whichever artifacts exist. Idempotent.
    pub fn clear(&self) -> Result<()> {
        for name in [MODEL_FILE, MATRIX_FILE, DOCUMENTS_FILE] {
            let path = self.dir.join(name);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("removing {}", path.display()));
                }
            }
        }
        Ok(())
    }

    fn write_artifact<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value).with_context(|| format!("serializing {}", name))?;
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!("{}.tmp", name));
        std::fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("publishing {}", path.display()))?;
        Ok(())
    }

    fn read_artifact<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }
}

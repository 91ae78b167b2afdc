use super::base::{StorageError, VacancyStore};
use crate::models::VacancyId;
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
struct SeenFile {
    #[serde(rename = "vacanciesId")]
    vacancies_id: BTreeSet<VacancyId>,
}

/// `<stem>.json` holds the seen ids, `<stem>.txt` the delivery log.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    json_path: PathBuf,
    log_path: PathBuf,
}

impl DiskStorage {
    pub fn new<P: AsRef<Path>>(base_path: P, stem: &str) -> Self {
        let base_path = base_path.as_ref();
        Self {
            json_path: base_path.join(format!("{}.json", stem)),
            log_path: base_path.join(format!("{}.txt", stem)),
        }
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    async fn ensure_parent(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VacancyStore for DiskStorage {
    async fn load_seen(&self) -> Result<BTreeSet<VacancyId>, StorageError> {
        if !fs::try_exists(&self.json_path).await? {
            info!(
                "No seen-vacancy file at {}, starting empty",
                self.json_path.display()
            );
            self.save_seen(&BTreeSet::new()).await?;
            return Ok(BTreeSet::new());
        }

        let raw = fs::read_to_string(&self.json_path).await?;
        let file: SeenFile = serde_json::from_str(&raw)?;
        debug!(
            "Loaded {} seen vacancies from {}",
            file.vacancies_id.len(),
            self.json_path.display()
        );
        Ok(file.vacancies_id)
    }

    async fn save_seen(&self, ids: &BTreeSet<VacancyId>) -> Result<(), StorageError> {
        self.ensure_parent(&self.json_path).await?;

        let json = serde_json::to_string(&SeenFile {
            vacancies_id: ids.clone(),
        })?;
        let tmp_path = self
            .json_path
            .with_extension(format!("{}.tmp", Uuid::now_v7()));
        fs::write(&tmp_path, json).await?;
        if let Err(error) = fs::rename(&tmp_path, &self.json_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(error.into());
        }
        Ok(())
    }

    async fn append_log(&self, lines: &[String]) -> Result<(), StorageError> {
        if lines.is_empty() {
            return Ok(());
        }
        self.ensure_parent(&self.log_path).await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await?;
        let mut chunk = lines.join("\n");
        chunk.push('\n');
        file.write_all(chunk.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

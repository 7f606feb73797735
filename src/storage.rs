use crate::model::Roster;
use anyhow::Context;
use fd_lock::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Persistance d'un instantané complet du roster.
pub trait Storage {
    /// Erreur si le support est absent ou illisible.
    fn load(&self) -> anyhow::Result<Roster>;
    /// Remplace l'instantané précédent en une seule opération.
    fn save(&self, roster: &Roster) -> anyhow::Result<()>;
}

/// Roster dans un fichier JSON unique.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Verrou consultatif `<roster>.lock`, à tenir en écriture entre le
    /// chargement et la sauvegarde. Le fichier du roster lui-même est remplacé
    /// à chaque sauvegarde, il ne peut donc pas porter le verrou.
    pub fn lock_file(&self) -> anyhow::Result<RwLock<File>> {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        let lock_path = PathBuf::from(name);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("opening {}", lock_path.display()))?;
        Ok(RwLock::new(file))
    }

    /// Roster vide si le fichier n'existe pas encore ; une erreur de lecture
    /// ou de parsing reste une erreur.
    pub fn load_or_default(&self) -> anyhow::Result<Roster> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no roster file yet, starting empty");
            return Ok(Roster::default());
        }
        self.load()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<Roster> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let roster: Roster = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(roster)
    }

    fn save(&self, roster: &Roster) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(roster)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        tracing::debug!(
            path = %self.path.display(),
            assignments = roster.assignments.len(),
            "roster saved"
        );
        Ok(())
    }
}

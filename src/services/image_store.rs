use async_trait::async_trait;
use std::io;
use std::path::PathBuf;

/// Stockage des images produit, référencées par leur nom de fichier seul
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn save(&self, filename: &str, data: &[u8]) -> io::Result<()>;

    /// Supprime le fichier s'il existe (pas d'erreur s'il est déjà absent)
    async fn delete(&self, filename: &str) -> io::Result<()>;

    async fn exists(&self, filename: &str) -> bool;
}

/// Images sur disque dans UPLOAD_FOLDER
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, filename: &str, data: &[u8]) -> io::Result<()> {
        tokio::fs::write(self.root.join(filename), data).await
    }

    async fn delete(&self, filename: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.root.join(filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn exists(&self, filename: &str) -> bool {
        tokio::fs::try_exists(self.root.join(filename)).await.unwrap_or(false)
    }
}

// src/services/storage.rs

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

/// Armazenamento das fotos dos sacs. Trocar o backend (S3, blob...)
/// só exige outra implementação deste trait.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Grava o conteúdo sob `key` e devolve a URL pública.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, AppError>;

    /// Remove pelo URL público. URLs desconhecidas são ignoradas.
    async fn delete(&self, url: &str) -> Result<(), AppError>;
}

/// Valida tipo e tamanho; devolve a extensão do arquivo.
pub fn validate_upload(content_type: Option<&str>, size: usize) -> Result<&'static str, AppError> {
    let extension = content_type
        .and_then(|ct| ALLOWED_TYPES.iter().find(|(mime, _)| *mime == ct))
        .map(|(_, ext)| *ext)
        .ok_or_else(|| {
            AppError::business("Type de fichier non autorise. Utilisez JPG, PNG, WebP ou GIF.")
        })?;

    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::business("Fichier trop volumineux. Maximum 5MB."));
    }

    Ok(extension)
}

/// `bags/{timestamp_ms}-{aleatório}.{ext}`
pub fn build_blob_key(extension: &str, timestamp_ms: i64) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("bags/{}-{}.{}", timestamp_ms, &random[..6], extension)
}

// --- Implementação em disco local, servida em /uploads ---

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_prefix: format!("{}/uploads/", public_base_url.trim_end_matches('/')),
        }
    }

    // Só aceita chaves relativas simples (sem "..", sem caminho absoluto)
    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        (safe && !key.is_empty()).then(|| self.root.join(relative))
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.public_prefix.as_str())
            .or_else(|| url.strip_prefix("/uploads/"))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, AppError> {
        let path = self
            .path_for(key)
            .ok_or_else(|| AppError::business("Nom de fichier invalide"))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("Falha ao criar diretório {:?}: {}", parent, e))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| anyhow::anyhow!("Falha ao gravar {:?}: {}", path, e))?;

        Ok(format!("{}{}", self.public_prefix, key))
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        let Some(path) = self.key_from_url(url).and_then(|key| self.path_for(key)) else {
            tracing::warn!("URL de fichier inconnue, rien a supprimer: {}", url);
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::anyhow!("Falha ao remover {:?}: {}", path, e).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("image/jpeg", "jpg")]
    #[case("image/png", "png")]
    #[case("image/webp", "webp")]
    #[case("image/gif", "gif")]
    fn accepts_images(#[case] content_type: &str, #[case] ext: &str) {
        assert_eq!(validate_upload(Some(content_type), 1024).unwrap(), ext);
    }

    #[test]
    fn rejects_other_types_and_large_files() {
        let err = validate_upload(Some("application/pdf"), 10).unwrap_err();
        assert_eq!(err.to_string(), "Type de fichier non autorise. Utilisez JPG, PNG, WebP ou GIF.");
        assert!(validate_upload(None, 10).is_err());

        let err = validate_upload(Some("image/png"), MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert_eq!(err.to_string(), "Fichier trop volumineux. Maximum 5MB.");
        assert!(validate_upload(Some("image/png"), MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn keys_follow_bags_layout() {
        let key = build_blob_key("png", 1736500000000);
        assert!(key.starts_with("bags/1736500000000-"));
        assert!(key.ends_with(".png"));
        assert_eq!(key.len(), "bags/1736500000000-abcdef.png".len());
    }

    #[tokio::test]
    async fn local_store_writes_and_deletes_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:3000/");

        let url = store.put("bags/1-abc.png", vec![1, 2, 3]).await.unwrap();
        assert_eq!(url, "http://localhost:3000/uploads/bags/1-abc.png");
        let on_disk = dir.path().join("bags/1-abc.png");
        assert_eq!(std::fs::read(&on_disk).unwrap(), vec![1, 2, 3]);

        store.delete(&url).await.unwrap();
        assert!(!on_disk.exists());

        // Segunda remoção e URLs externas não falham
        store.delete(&url).await.unwrap();
        store.delete("https://cdn.example.com/x.png").await.unwrap();
    }

    #[tokio::test]
    async fn local_store_refuses_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:3000");
        assert!(store.put("../evil.png", vec![0]).await.is_err());
        store.delete("/uploads/../../etc/passwd").await.unwrap();
    }
}

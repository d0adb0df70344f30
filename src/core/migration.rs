use crate::domain::model::MigrationReport;
use crate::domain::ports::MigrationTool;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

pub const DEFAULT_REVISION_EXTENSION: &str = "py";
pub const DEFAULT_MESSAGE: &str = "Initial migration";
pub const DEFAULT_TARGET: &str = "head";

/// Brings the schema up to `target`, bootstrapping an initial revision when the
/// revision directory holds none.
pub struct MigrationRunner<T: MigrationTool> {
    tool: T,
    directory: PathBuf,
    extension: String,
    autogenerate: bool,
    message: String,
    target: String,
}

impl<T: MigrationTool> MigrationRunner<T> {
    pub fn new(tool: T, directory: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            directory: directory.into(),
            extension: DEFAULT_REVISION_EXTENSION.to_string(),
            autogenerate: true,
            message: DEFAULT_MESSAGE.to_string(),
            target: DEFAULT_TARGET.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_autogenerate(mut self, autogenerate: bool) -> Self {
        self.autogenerate = autogenerate;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub async fn run(&self) -> Result<MigrationReport> {
        // Ensure the directory exists
        if !tokio::fs::try_exists(&self.directory).await? {
            tracing::info!(
                "📁 Creating migrations directory {}",
                self.directory.display()
            );
            tokio::fs::create_dir_all(&self.directory).await?;
        }

        let revisions = revision_files(&self.directory, &self.extension).await?;
        tracing::info!(
            "Found {} revision file(s) in {}",
            revisions.len(),
            self.directory.display()
        );

        // Bootstrap an initial revision
        let mut generated = false;
        if revisions.is_empty() {
            if self.autogenerate {
                tracing::info!("🛠️ No revisions found, generating \"{}\"", self.message);
                self.tool.generate(&self.message).await?;
                generated = true;
            } else {
                tracing::warn!("No revisions found and autogenerate is disabled");
            }
        }

        // Apply
        tracing::info!("⬆️ Applying migrations up to {}", self.target);
        self.tool.upgrade(&self.target).await?;
        tracing::info!("✅ Migrations applied");

        Ok(MigrationReport {
            revisions_found: revisions.len(),
            generated,
            target: self.target.clone(),
        })
    }
}

/// Revision files directly under `dir`, sorted. Names starting with `_` or `.`
/// (package markers, caches, editor files) are not revisions.
pub async fn revision_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with('_') || name.starts_with('.'))
            .unwrap_or(true);
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == extension)
            .unwrap_or(false);

        if !hidden && matches_extension {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_revision_files_skips_package_markers() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("__init__.py"), "").unwrap();
        fs::write(dir.path().join(".hidden.py"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("__pycache__")).unwrap();
        fs::write(dir.path().join("b2_add_users.py"), "").unwrap();
        fs::write(dir.path().join("a1_initial.py"), "").unwrap();

        let files = revision_files(dir.path(), "py").await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["a1_initial.py", "b2_add_users.py"]);
    }

    #[tokio::test]
    async fn test_revision_files_custom_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0001_init.sql"), "").unwrap();
        fs::write(dir.path().join("0001_init.py"), "").unwrap();

        assert_eq!(revision_files(dir.path(), "sql").await.unwrap().len(), 1);
    }

    #[test]
    fn test_revision_files_missing_dir_is_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(tokio_test::block_on(revision_files(&missing, "py")).is_err());
    }
}

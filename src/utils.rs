use std::io;
use std::path::Path;

/// Creates `path` as a directory tree if it does not exist yet.
///
/// Fails if the path exists but is not a directory.
pub(crate) async fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => tokio::fs::create_dir_all(path).await,
        Err(e) => Err(e),
    }
}

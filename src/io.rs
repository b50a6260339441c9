//! Reading and writing JSON from files or standard I/O.

use tokio::{
    fs::File,
    io::{AsyncReadExt as _, AsyncWrite, AsyncWriteExt as _, BufWriter},
};

use crate::prelude::*;

/// Read JSON from a file, or from standard input if `path` is `None`.
pub async fn read_json<T>(path: Option<&Path>) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let mut data = String::new();
    let description = match path {
        Some(path) => {
            File::open(path)
                .await
                .with_context(|| format!("Failed to open file at path: {:?}", path))?
                .read_to_string(&mut data)
                .await
                .with_context(|| format!("Failed to read file at path: {:?}", path))?;
            format!("{:?}", path)
        }
        None => {
            tokio::io::stdin()
                .read_to_string(&mut data)
                .await
                .context("Failed to read standard input")?;
            "stdin".to_owned()
        }
    };
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse JSON from {}", description))
}

/// Create an [`AsyncWrite`] for a file or stdout.
pub async fn create_writer(
    path: Option<&Path>,
) -> Result<Box<dyn AsyncWrite + Unpin + Send + Sync + 'static>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .await
                .with_context(|| format!("Failed to create file at path: {:?}", path))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdout())),
    }
}

/// Write a value as pretty-printed JSON to a file or stdout.
pub async fn write_json<T>(path: Option<&Path>, value: &T) -> Result<()>
where
    T: Serialize,
{
    let mut writer = BufWriter::new(create_writer(path).await?);
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    writer
        .write_all(json.as_bytes())
        .await
        .context("Failed to write JSON to output")?;
    writer
        .write_all(b"\n")
        .await
        .context("Failed to write newline to output")?;
    writer.flush().await.context("Failed to flush output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        let event = json!({ "bucket": "covenants", "key": "raw/a/b.tif" });
        write_json(Some(&path), &event).await.unwrap();
        let read: Value = read_json(Some(&path)).await.unwrap();
        assert_eq!(read, event);
    }

    #[tokio::test]
    async fn test_read_invalid_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = read_json::<Value>(Some(&path)).await.unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }
}

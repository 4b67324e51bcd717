//! Message source backed by a JSON channel export file.
//!
//! The chat platform itself stays outside this tool; runs consume an
//! export file holding the channel's messages, either as a bare array or
//! wrapped in a `{"messages": [...]}` object.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use fundwire_domain::{MessageSource, RawMessage, SourceError};

/// Reads raw messages from a JSON export on disk.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    path: PathBuf,
}

#[derive(Deserialize)]
struct Export {
    messages: Vec<RawMessage>,
}

impl JsonExportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MessageSource for JsonExportSource {
    async fn fetch(&self, _channel: &str, limit: usize) -> Result<Vec<RawMessage>, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let messages = match serde_json::from_str::<Vec<RawMessage>>(&contents) {
            Ok(messages) => messages,
            Err(_) => serde_json::from_str::<Export>(&contents)
                .map_err(|e| SourceError::Decode(e.to_string()))?
                .messages,
        };
        Ok(messages.into_iter().take(limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_export(contents: &str) -> (tempfile::TempDir, JsonExportSource) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, contents).unwrap();
        (dir, JsonExportSource::new(path))
    }

    #[tokio::test]
    async fn reads_bare_array() {
        let (_dir, source) = write_export(
            r#"[{"id":1,"date":"2024-01-01T00:00:00Z","senderId":"s","text":"hello"}]"#,
        );
        let messages = source.fetch("chan", 10).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hello");
    }

    #[tokio::test]
    async fn reads_wrapped_object_and_respects_limit() {
        let (_dir, source) = write_export(
            r#"{"messages":[
                {"id":1,"date":"d","senderId":"s","text":"a"},
                {"id":2,"date":"d","senderId":"s","text":"b"},
                {"id":3,"date":"d","senderId":"s","text":"c"}
            ]}"#,
        );
        let messages = source.fetch("chan", 2).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].id, 2);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let source = JsonExportSource::new("/nonexistent/export.json");
        assert!(matches!(
            source.fetch("chan", 10).await,
            Err(SourceError::Io(_))
        ));
    }

    #[tokio::test]
    async fn garbage_is_a_decode_error() {
        let (_dir, source) = write_export("not json");
        assert!(matches!(
            source.fetch("chan", 10).await,
            Err(SourceError::Decode(_))
        ));
    }
}

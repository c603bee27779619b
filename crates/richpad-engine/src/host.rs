//! Hooks the embedding surface provides: change/blur notifications and the
//! asynchronous callbacks behind mentions and file attachments.

use async_trait::async_trait;
use thiserror::Error;

use crate::media;
use crate::pickers::MentionCandidate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("Failed to read attachment {name}: {reason}")]
    Read { name: String, reason: String },

    #[error("Mention lookup failed: {0}")]
    Lookup(String),

    #[error("Service request failed: {0}")]
    Service(String),
}

/// Receives notifications from a session. Both hooks default to no-ops.
pub trait Host {
    /// Called with the serialized document after every committed change.
    fn on_change(&mut self, _markup: &str) {}

    fn on_blur(&mut self) {}
}

/// A host that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

impl Host for NoopHost {}

/// Records notifications, for tests and scripted runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingHost {
    pub changes: Vec<String>,
    pub blurs: usize,
}

impl Host for RecordingHost {
    fn on_change(&mut self, markup: &str) {
        self.changes.push(markup.to_string());
    }

    fn on_blur(&mut self) {
        self.blurs += 1;
    }
}

#[async_trait(?Send)]
pub trait MentionProvider {
    async fn search(&self, query: &str) -> Result<Vec<MentionCandidate>, HostError>;
}

/// A file the user picked for upload.
#[async_trait(?Send)]
pub trait AttachmentFile {
    fn name(&self) -> &str;

    /// Declared mime type, when the host knows it.
    fn mime_type(&self) -> Option<&str> {
        None
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, HostError>;
}

/// Reads a file into a `data:` URI that can be stored inline in the markup.
pub async fn read_as_data_uri(file: &dyn AttachmentFile) -> Result<String, HostError> {
    let bytes = file.read_bytes().await?;
    let mime = file
        .mime_type()
        .map(str::to_string)
        .unwrap_or_else(|| media::guess_mime(file.name()).to_string());
    log::debug!("read {} ({} bytes, {mime})", file.name(), bytes.len());
    Ok(media::to_data_uri(&mime, &bytes))
}

/// An attachment already held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[async_trait(?Send)]
impl AttachmentFile for InMemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, HostError> {
        Ok(self.bytes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    struct Unreadable;

    #[async_trait(?Send)]
    impl AttachmentFile for Unreadable {
        fn name(&self) -> &str {
            "gone.png"
        }

        async fn read_bytes(&self) -> Result<Vec<u8>, HostError> {
            Err(HostError::Read {
                name: self.name().to_string(),
                reason: "permission denied".into(),
            })
        }
    }

    #[test]
    fn mime_type_is_guessed_from_extension() {
        let file = InMemoryFile {
            name: "dot.png".into(),
            mime_type: None,
            bytes: b"abc".to_vec(),
        };
        let uri = block_on(read_as_data_uri(&file)).unwrap();
        assert_eq!(uri, "data:image/png;base64,YWJj");
    }

    #[test]
    fn declared_mime_type_wins() {
        let file = InMemoryFile {
            name: "photo".into(),
            mime_type: Some("image/webp".into()),
            bytes: vec![0xff],
        };
        let uri = block_on(read_as_data_uri(&file)).unwrap();
        assert!(uri.starts_with("data:image/webp;base64,"));
    }

    #[test]
    fn read_failure_is_reported() {
        let err = block_on(read_as_data_uri(&Unreadable)).unwrap_err();
        assert_eq!(err.to_string(), "Failed to read attachment gone.png: permission denied");
    }

    #[test]
    fn recording_host_keeps_every_change() {
        let mut host = RecordingHost::default();
        host.on_change("<p>a</p>");
        host.on_blur();
        assert_eq!(host.changes, vec!["<p>a</p>".to_string()]);
        assert_eq!(host.blurs, 1);
    }
}

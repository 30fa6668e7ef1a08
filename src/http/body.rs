//! Buffered, replayable message bodies.
//!
//! # Responsibilities
//! - Drain a read-once body stream into memory, bounded by a size limit
//! - Mint independent readers over the buffered bytes
//!
//! # Design Decisions
//! - The buffer owns its `Bytes`; each reader is a cheap refcounted clone
//! - No shared cursor: every reader starts at the beginning
//! - A failed replay puts back a body that yields every byte of the original:
//!   the buffered prefix, then whatever the stream had not yet produced

use std::borrow::Cow;

use axum::body::{Body, BodyDataStream, Bytes, HttpBody};
use futures_util::{stream, StreamExt};

use crate::policy::ExecutionError;

/// Owned body bytes with a factory for fresh readers.
#[derive(Debug, Clone, Default)]
pub struct BufferedBody {
    bytes: Bytes,
}

impl BufferedBody {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Read `body` to the end. Fails if it exceeds `limit` bytes.
    pub async fn drain(body: Body, limit: usize) -> Result<Self, ExecutionError> {
        let bytes = axum::body::to_bytes(body, limit)
            .await
            .map_err(|e| ExecutionError::BodyRead(e.to_string()))?;
        Ok(Self { bytes })
    }

    /// Drain `body` in place and reinstate a fresh reader over the same bytes.
    ///
    /// On failure `body` still yields its full content. A body whose known
    /// length exceeds `limit` is rejected without being read.
    pub async fn replay(body: &mut Body, limit: usize) -> Result<Self, ExecutionError> {
        if body.size_hint().lower() > limit as u64 {
            return Err(limit_exceeded(limit));
        }

        let mut data = std::mem::take(body).into_data_stream();
        let mut chunks: Vec<Bytes> = Vec::new();
        let mut total = 0usize;

        while let Some(next) = data.next().await {
            match next {
                Ok(chunk) => {
                    total += chunk.len();
                    chunks.push(chunk);
                    if total > limit {
                        *body = restore(chunks, data);
                        return Err(limit_exceeded(limit));
                    }
                }
                Err(e) => {
                    *body = restore(chunks, data);
                    return Err(ExecutionError::BodyRead(e.to_string()));
                }
            }
        }

        let bytes = match chunks.len() {
            1 => chunks.swap_remove(0),
            _ => Bytes::from(chunks.concat()),
        };
        let buffered = Self { bytes };
        *body = buffered.reader();
        Ok(buffered)
    }

    /// A new body positioned at the start of the buffer.
    pub fn reader(&self) -> Body {
        Body::from(self.bytes.clone())
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Body as text. Invalid UTF-8 is replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn limit_exceeded(limit: usize) -> ExecutionError {
    ExecutionError::BodyRead(format!("length limit of {limit} bytes exceeded"))
}

/// A body yielding `prefix` followed by the unread rest of `remainder`.
fn restore(prefix: Vec<Bytes>, remainder: BodyDataStream) -> Body {
    let prefix = stream::iter(prefix.into_iter().map(Ok::<_, axum::Error>));
    Body::from_stream(prefix.chain(remainder))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_all(body: Body) -> String {
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_replay_restores_body() {
        let mut body = Body::from("hello");
        let buffered = BufferedBody::replay(&mut body, 1024).await.unwrap();

        assert_eq!(buffered.text(), "hello");
        assert_eq!(read_all(body).await, "hello");
    }

    #[tokio::test]
    async fn test_readers_are_independent() {
        let buffered = BufferedBody::from_bytes("payload");
        let first = buffered.reader();
        let second = buffered.reader();

        assert_eq!(read_all(first).await, "payload");
        assert_eq!(read_all(second).await, "payload");
        assert_eq!(buffered.len(), 7);
    }

    fn chunked(parts: &'static [&'static str]) -> Body {
        let items = parts
            .iter()
            .copied()
            .map(|p| Ok::<_, std::io::Error>(Bytes::from_static(p.as_bytes())));
        Body::from_stream(stream::iter(items.collect::<Vec<_>>()))
    }

    #[tokio::test]
    async fn test_limit_exceeded_keeps_body() {
        let mut body = Body::from("0123456789");
        let err = BufferedBody::replay(&mut body, 4).await.unwrap_err();
        assert!(matches!(err, ExecutionError::BodyRead(_)));
        assert_eq!(read_all(body).await, "0123456789");
    }

    #[tokio::test]
    async fn test_streamed_limit_exceeded_keeps_body() {
        let mut body = chunked(&["0123", "4567", "89"]);
        let err = BufferedBody::replay(&mut body, 5).await.unwrap_err();
        assert!(err.to_string().contains("length limit of 5 bytes exceeded"));
        assert_eq!(read_all(body).await, "0123456789");
    }

    #[tokio::test]
    async fn test_streamed_replay_joins_chunks() {
        let mut body = chunked(&["hel", "lo"]);
        let buffered = BufferedBody::replay(&mut body, 5).await.unwrap();
        assert_eq!(buffered.text(), "hello");
        assert_eq!(read_all(body).await, "hello");
    }

    #[tokio::test]
    async fn test_stream_error_keeps_prefix() {
        let items = vec![
            Ok(Bytes::from_static(b"abc")),
            Err(std::io::Error::other("reset")),
        ];
        let mut body = Body::from_stream(stream::iter(items));
        let err = BufferedBody::replay(&mut body, 1024).await.unwrap_err();
        assert!(matches!(err, ExecutionError::BodyRead(_)));

        let mut rest = body.into_data_stream();
        assert_eq!(rest.next().await.unwrap().unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_empty_body() {
        let buffered = BufferedBody::drain(Body::empty(), 16).await.unwrap();
        assert!(buffered.is_empty());
        assert_eq!(buffered.text(), "");
    }
}

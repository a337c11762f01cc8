use std::fmt::Display;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};

use crate::error::StoreError;

/// Assemble a chunked byte stream into one contiguous buffer.
///
/// Chunks are appended in arrival order. The first failing chunk aborts the
/// whole read; nothing collected so far is returned.
pub async fn collect_chunks<S, E>(mut stream: S) -> Result<Bytes, StoreError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| StoreError::Backend(format!("byte stream failed: {e}")))?;
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;

    #[tokio::test]
    async fn concatenates_in_order() {
        let chunks: Vec<Result<Bytes, String>> = vec![
            Ok(Bytes::from_static(b"hello")),
            Ok(Bytes::from_static(b", ")),
            Ok(Bytes::from_static(b"world")),
        ];
        let bytes = collect_chunks(stream::iter(chunks)).await.unwrap();
        assert_eq!(&bytes[..], b"hello, world");
    }

    #[tokio::test]
    async fn empty_stream_yields_empty_buffer() {
        let chunks: Vec<Result<Bytes, String>> = Vec::new();
        let bytes = collect_chunks(stream::iter(chunks)).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn failing_chunk_aborts_read() {
        let chunks: Vec<Result<Bytes, String>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err("connection reset".to_owned()),
            Ok(Bytes::from_static(b"never seen")),
        ];
        let err = collect_chunks(stream::iter(chunks)).await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(msg) if msg.contains("connection reset")));
    }
}

//! Byte counting reader for transfer progress

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use ol_core::ProgressFn;

/// Wraps a reader and reports `(bytes_so_far, total)` after every read.
///
/// The observer is called inline, before the read returns to the copy loop.
/// Reads that yield zero bytes (end of stream) are not reported.
pub struct ProgressReader<R> {
    inner: R,
    total: u64,
    transferred: u64,
    observer: ProgressFn,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, total: u64, observer: ProgressFn) -> Self {
        Self {
            inner,
            total,
            transferred: 0,
            observer,
        }
    }

    /// Bytes read so far
    pub fn transferred(&self) -> u64 {
        self.transferred
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let this = &mut *self;

        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let read = (buf.filled().len() - before) as u64;
                if read > 0 {
                    this.transferred += read;
                    (this.observer)(this.transferred, this.total);
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}

//! Upload and download
//!
//! Both directions stream: the upload reads the local file straight into the
//! multipart body, and the download copies the response body straight into
//! the destination file. Neither holds a whole file in memory.

use std::path::Path;

use futures::TryStreamExt;
use reqwest::Url;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::{ReaderStream, StreamReader};

use ol_core::{Error, ProgressFn, Result, base_name, encode_path_header, join_remote};

use crate::client::OpenListClient;
use crate::dispatch::{ResponseEnvelope, SUCCESS_CODE};
use crate::progress::ProgressReader;
use crate::types::{FILE_PATH_HEADER, UPLOAD_ENDPOINT, UPLOAD_FIELD};

/// Tell stream failures (network) apart from local write failures.
fn copy_error(e: std::io::Error) -> Error {
    let from_network = e
        .get_ref()
        .is_some_and(|inner| inner.is::<reqwest::Error>());
    if from_network {
        Error::Network(format!("download interrupted: {e}"))
    } else {
        Error::Io(e)
    }
}

impl OpenListClient {
    /// Upload a local file into `remote_dir`.
    ///
    /// Returns the remote path written, e.g. `/docs/report.txt` for
    /// `("/tmp/x/report.txt", "/docs/")`.
    pub async fn upload_file(&self, local: &Path, remote_dir: &str) -> Result<String> {
        self.login().await?;

        let metadata = match tokio::fs::metadata(local).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => {
                return Err(Error::InvalidPath(format!(
                    "not a regular file: {}",
                    local.display()
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(local.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let file_name = base_name(local)?;
        let remote_path = join_remote(remote_dir, &file_name);
        let encoded_path = encode_path_header(&remote_path);

        // Owned by the body stream; closed when the request finishes or fails
        let file = tokio::fs::File::open(local).await?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let mime = mime_guess::from_path(local).first_or_octet_stream();
        let part = Part::stream_with_length(body, metadata.len())
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .map_err(|e| Error::Request(format!("invalid content type: {e}")))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let token = self.token().await.unwrap_or_default();
        let http = self.dispatcher.http();
        let request = http
            .put(self.endpoint(UPLOAD_ENDPOINT))
            .header(AUTHORIZATION, token)
            .header(FILE_PATH_HEADER, &encoded_path)
            .timeout(self.upload_timeout)
            .multipart(form)
            .build()
            .map_err(|e| Error::Request(e.to_string()))?;

        tracing::debug!(
            local = %local.display(),
            remote = %remote_path,
            size = metadata.len(),
            "Uploading file"
        );

        let response = http
            .execute(request)
            .await
            .map_err(|e| Error::Network(format!("upload request failed: {e}")))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("failed to read upload response: {e}")))?;

        match serde_json::from_str::<ResponseEnvelope>(&text) {
            Ok(envelope) if status == 200 && envelope.code == SUCCESS_CODE => {
                tracing::debug!(remote = %remote_path, "Upload complete");
                Ok(remote_path)
            }
            Ok(envelope) => Err(Error::Upload {
                status,
                code: envelope.code,
                message: envelope.message,
            }),
            Err(_) if status != 200 => Err(Error::Upload {
                status,
                code: 0,
                message: text,
            }),
            Err(e) => Err(Error::Decode {
                body: text,
                reason: e.to_string(),
            }),
        }
    }

    /// Download a remote file to `local`, truncating any existing file.
    ///
    /// `on_progress` receives `(bytes_so_far, total)` after each chunk;
    /// `total` comes from the file metadata, then `Content-Length`, and is 0
    /// when neither is known.
    pub async fn download_file(
        &self,
        remote: &str,
        local: &Path,
        on_progress: Option<ProgressFn>,
    ) -> Result<()> {
        self.login().await?;

        let info = self.get_file_info(remote).await?;
        if info.raw_url.is_empty() {
            return Err(Error::Request(format!("no download address for {remote}")));
        }
        let url = Url::parse(&info.raw_url)
            .map_err(|e| Error::Request(format!("invalid download address '{}': {e}", info.raw_url)))?;

        let http = self.dispatcher.http();
        // The client-wide timeout would cut long bodies off mid-stream
        let mut builder = http.get(url).timeout(self.download_timeout);
        if let Some(token) = self.token().await {
            builder = builder.header(AUTHORIZATION, token);
        }
        let request = builder.build().map_err(|e| Error::Request(e.to_string()))?;

        let response = http
            .execute(request)
            .await
            .map_err(|e| Error::Network(format!("download request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let total = if info.size > 0 {
            info.size as u64
        } else {
            response.content_length().unwrap_or(0)
        };

        tracing::debug!(remote = %remote, local = %local.display(), total, "Downloading file");

        let file = tokio::fs::File::create(local).await?;
        let mut writer = BufWriter::new(file);
        let stream = Box::pin(response.bytes_stream().map_err(std::io::Error::other));
        let reader = StreamReader::new(stream);

        let copied = match on_progress {
            Some(observer) => {
                let mut reader = ProgressReader::new(reader, total, observer);
                tokio::io::copy(&mut reader, &mut writer).await
            }
            None => {
                let mut reader = reader;
                tokio::io::copy(&mut reader, &mut writer).await
            }
        }
        .map_err(copy_error)?;

        writer.flush().await?;

        tracing::debug!(remote = %remote, bytes = copied, "Download complete");
        Ok(())
    }
}

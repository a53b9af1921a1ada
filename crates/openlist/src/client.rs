//! OpenList client implementation
//!
//! Holds the session (base address, credentials, cached token), the proxy
//! prober and the shared HTTP client, and implements the `FileStore` trait
//! from ol-core.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::sync::RwLock;

use ol_core::{
    Error, FileEntry, FileStore, ListOptions, Listing, ProgressFn, Result, SearchOptions,
    SearchResults, ServerConfig, Timeouts,
};

use crate::dispatch::{Dispatcher, RequestEnvelope};
use crate::proxy::{ProxyProber, ProxyStatus};
use crate::types::{
    GET_ENDPOINT, GetRequest, LIST_ENDPOINT, LOGIN_ENDPOINT, ListRequest, LoginData,
    LoginRequest, MKDIR_ENDPOINT, MkdirRequest, REMOVE_ENDPOINT, RemoveRequest,
    SEARCH_ENDPOINT, SearchRequest,
};

/// OpenList client
///
/// One instance is one session. The token is fetched on first use and kept
/// for the lifetime of the instance; create a new client to log in again.
pub struct OpenListClient {
    base_url: String,
    username: String,
    password: String,
    token: RwLock<Option<String>>,
    proxy: ProxyProber,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) upload_timeout: Duration,
    pub(crate) download_timeout: Duration,
}

impl std::fmt::Debug for OpenListClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenListClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("proxy", &self.proxy_address())
            .finish_non_exhaustive()
    }
}

impl OpenListClient {
    /// Create a new client from a server configuration
    pub fn new(server: &ServerConfig, timeouts: &Timeouts) -> Result<Self> {
        server.validate()?;

        let mut builder = reqwest::Client::builder().timeout(timeouts.request());
        if let Some(proxy) = server.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            match reqwest::Proxy::all(proxy) {
                Ok(p) => builder = builder.proxy(p),
                Err(e) => {
                    tracing::warn!(proxy = %proxy, error = %e, "Ignoring invalid proxy, connecting directly");
                }
            }
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: server.url.trim_end_matches('/').to_string(),
            username: server.username.clone(),
            password: server.password.clone(),
            token: RwLock::new(None),
            proxy: ProxyProber::new(server.proxy.clone(), timeouts.proxy_probe()),
            dispatcher: Dispatcher::new(http),
            upload_timeout: timeouts.upload(),
            download_timeout: timeouts.download(),
        })
    }

    /// Base address without trailing separator
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Probe the configured proxy, caching the outcome.
    ///
    /// Always true when no proxy is configured.
    pub async fn test_proxy(&self) -> bool {
        self.proxy.test().await
    }

    /// Clear the cached proxy outcome so the next `test_proxy` probes again
    pub async fn reset_proxy_status(&self) {
        self.proxy.reset().await;
    }

    /// Configured proxy address, if any
    pub fn proxy_address(&self) -> Option<&str> {
        self.proxy.address()
    }

    /// Cached proxy outcome, without probing
    pub async fn proxy_status(&self) -> ProxyStatus {
        self.proxy.status().await
    }

    /// Current session token, if logged in
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Log in unless a token is already cached.
    ///
    /// The write lock is held across the login request, so concurrent
    /// first callers wait for one login instead of racing their own.
    pub async fn login(&self) -> Result<()> {
        if self.token.read().await.is_some() {
            return Ok(());
        }

        let mut token = self.token.write().await;
        if token.is_some() {
            return Ok(());
        }

        tracing::debug!(url = %self.base_url, username = %self.username, "Logging in");

        let envelope = RequestEnvelope::post(
            self.endpoint(LOGIN_ENDPOINT),
            LoginRequest {
                username: &self.username,
                password: &self.password,
            },
        );
        let data: LoginData = self
            .dispatcher
            .dispatch(&envelope, None)
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;

        if data.token.is_empty() {
            return Err(Error::Auth("server returned an empty token".to_string()));
        }

        *token = Some(data.token);
        Ok(())
    }

    /// Log in if needed, then dispatch with the session token
    pub(crate) async fn call<B, T>(&self, envelope: RequestEnvelope<B>) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.login().await?;
        let token = self.token().await;
        self.dispatcher.dispatch(&envelope, token.as_deref()).await
    }

    /// Metadata for a remote path, including its direct download address
    pub async fn get_file_info(&self, path: &str) -> Result<FileEntry> {
        self.call(RequestEnvelope::post(
            self.endpoint(GET_ENDPOINT),
            GetRequest { path, password: "" },
        ))
        .await
    }

    /// List a directory; an empty path is the root and page 0 is page 1
    pub async fn list_files(&self, path: &str, options: &ListOptions) -> Result<Listing> {
        let path = if path.is_empty() { "/" } else { path };
        self.call(RequestEnvelope::post(
            self.endpoint(LIST_ENDPOINT),
            ListRequest {
                path,
                password: &options.password,
                page: options.page.max(1),
                per_page: options.per_page,
                refresh: options.refresh,
            },
        ))
        .await
    }

    /// Search below `parent` (the root when empty)
    pub async fn search_files(
        &self,
        keywords: &str,
        parent: &str,
        options: &SearchOptions,
    ) -> Result<SearchResults> {
        let parent = if parent.is_empty() { "/" } else { parent };
        self.call(RequestEnvelope::post(
            self.endpoint(SEARCH_ENDPOINT),
            SearchRequest {
                parent,
                keywords,
                scope: options.scope,
                page: options.page.max(1),
                per_page: options.per_page,
                password: &options.password,
            },
        ))
        .await
    }

    /// Remove entries from a directory
    pub async fn remove_files(&self, dir: &str, names: &[String]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        let _: IgnoredAny = self
            .call(RequestEnvelope::post(
                self.endpoint(REMOVE_ENDPOINT),
                RemoveRequest { dir, names },
            ))
            .await?;
        Ok(())
    }

    /// Create a single directory
    pub async fn create_dir(&self, path: &str) -> Result<()> {
        let _: IgnoredAny = self
            .call(RequestEnvelope::post(
                self.endpoint(MKDIR_ENDPOINT),
                MkdirRequest { path },
            ))
            .await?;
        Ok(())
    }

    /// Create `path` and every missing ancestor
    pub async fn mkdirs(&self, path: &str) -> Result<()> {
        self.login().await?;
        ol_core::mkdirs(self, path).await
    }
}

#[async_trait]
impl FileStore for OpenListClient {
    async fn list(&self, path: &str, options: ListOptions) -> Result<Listing> {
        self.list_files(path, &options).await
    }

    async fn search(
        &self,
        parent: &str,
        keywords: &str,
        options: SearchOptions,
    ) -> Result<SearchResults> {
        self.search_files(keywords, parent, &options).await
    }

    async fn stat(&self, path: &str) -> Result<FileEntry> {
        self.get_file_info(path).await
    }

    async fn remove(&self, dir: &str, names: Vec<String>) -> Result<()> {
        self.remove_files(dir, &names).await
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        self.create_dir(path).await
    }

    async fn upload(&self, local: &Path, remote_dir: &str) -> Result<String> {
        self.upload_file(local, remote_dir).await
    }

    async fn download(
        &self,
        remote: &str,
        local: &Path,
        on_progress: Option<ProgressFn>,
    ) -> Result<()> {
        self.download_file(remote, local, on_progress).await
    }
}

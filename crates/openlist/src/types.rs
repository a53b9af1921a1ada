//! Request and response bodies of the OpenList API

use serde::{Deserialize, Serialize};

pub(crate) const LOGIN_ENDPOINT: &str = "/api/auth/login";
pub(crate) const LIST_ENDPOINT: &str = "/api/fs/list";
pub(crate) const GET_ENDPOINT: &str = "/api/fs/get";
pub(crate) const SEARCH_ENDPOINT: &str = "/api/fs/search";
pub(crate) const REMOVE_ENDPOINT: &str = "/api/fs/remove";
pub(crate) const MKDIR_ENDPOINT: &str = "/api/fs/mkdir";
pub(crate) const UPLOAD_ENDPOINT: &str = "/api/fs/form";

/// Header carrying the percent-encoded upload target
pub(crate) const FILE_PATH_HEADER: &str = "File-Path";

/// Multipart field holding the uploaded bytes
pub(crate) const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListRequest<'a> {
    pub path: &'a str,
    pub password: &'a str,
    pub page: u32,
    pub per_page: u32,
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetRequest<'a> {
    pub path: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub parent: &'a str,
    pub keywords: &'a str,
    pub scope: u8,
    pub page: u32,
    pub per_page: u32,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RemoveRequest<'a> {
    pub dir: &'a str,
    pub names: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct MkdirRequest<'a> {
    pub path: &'a str,
}

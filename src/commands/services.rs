//! Service factory for building command dependencies.
//!
//! Keeps construction of the HTTP-backed repository and downloader out of the
//! individual command handlers, which only see the traits.

use anyhow::Result;
use log::debug;

use crate::{
    context::LipContext,
    download::HttpDownloader,
    http::HttpClient,
    provider::GoProxyRepository,
    runtime::Runtime,
};

/// Build the shared HTTP client
pub fn build_http_client() -> Result<HttpClient> {
    HttpClient::build()
}

/// Build the GOPROXY repository from the context
pub fn build_repository(ctx: &LipContext, http_client: HttpClient) -> GoProxyRepository {
    debug!("Using GOPROXY {}", ctx.goproxy());
    GoProxyRepository::new(http_client, ctx.goproxy())
}

/// Services needed by commands that talk to the network.
pub struct Services<'a, R: Runtime> {
    pub repository: GoProxyRepository,
    pub downloader: HttpDownloader<'a, R>,
}

impl<'a, R: Runtime> Services<'a, R> {
    pub fn from_context(runtime: &'a R, ctx: &LipContext) -> Result<Self> {
        let http_client = build_http_client()?;
        Ok(Self {
            repository: build_repository(ctx, http_client.clone()),
            downloader: HttpDownloader::new(runtime, http_client),
        })
    }
}

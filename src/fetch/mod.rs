//! HTTP retrieval of statistics and reference data.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;

/// GETs `url` and returns the body, failing on non-success status codes.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Like [`fetch_bytes`], decoding the body as text.
pub async fn fetch_text<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<String> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.text().await?)
}

use anyhow::Result;
use async_trait::async_trait;
use speed_tiers::fetch::{BasicClient, fetch_bytes, fetch_text};
use speed_tiers::store::StatsMonth;
use tracing::{debug, warn};

use crate::services::stats_catalog::{SnapshotLink, StatsCatalog};

const STATS_BASE_URL: &str = "https://www.smogon.com/stats";
const POKEDEX_URL: &str = "https://play.pokemonshowdown.com/data/pokedex.json";
const FORMATS_URL: &str =
    "https://raw.githubusercontent.com/smogon/pokemon-showdown/master/config/formats.ts";

/// Monthly releases can be split into DLC and half-month directories.
const RELEASE_SUFFIXES: [&str; 5] = ["", "-DLC1", "-DLC2", "-H1", "-H2"];

pub struct SmogonClient {
    http: BasicClient,
    stats_base_url: String,
}

impl SmogonClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: BasicClient::new()?,
            stats_base_url: STATS_BASE_URL.to_string(),
        })
    }
}

#[async_trait]
impl StatsCatalog for SmogonClient {
    async fn list_snapshots(&self, month: StatsMonth) -> Result<Vec<SnapshotLink>> {
        let mut links: Vec<SnapshotLink> = Vec::new();

        for suffix in RELEASE_SUFFIXES {
            let index_url = format!("{}/{}{}/chaos/", self.stats_base_url, month, suffix);

            let html = match fetch_text(&self.http, &index_url).await {
                Ok(html) => html,
                Err(e) => {
                    debug!(url = %index_url, error = %e, "Stats index unavailable");
                    continue;
                }
            };

            for href in extract_json_links(&html) {
                let file_name = format!("{month}-{href}");
                if links.iter().any(|l| l.file_name == file_name) {
                    continue;
                }
                links.push(SnapshotLink {
                    file_name,
                    url: format!("{index_url}{href}"),
                });
            }
        }

        if links.is_empty() {
            warn!(month = %month, "No snapshots published for month");
        }

        Ok(links)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        fetch_bytes(&self.http, url).await
    }

    async fn fetch_pokedex(&self) -> Result<Vec<u8>> {
        fetch_bytes(&self.http, POKEDEX_URL).await
    }

    async fn fetch_format_names(&self) -> Result<Vec<String>> {
        let source = fetch_text(&self.http, FORMATS_URL).await?;
        Ok(extract_format_names(&source))
    }
}

/// Relative `.json` links from a directory index page.
pub fn extract_json_links(html: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut rest = html;

    while let Some(start) = rest.find("href=\"") {
        rest = &rest[start + "href=\"".len()..];
        let Some(end) = rest.find('"') else {
            break;
        };
        let href = &rest[..end];
        if href.ends_with(".json") && !href.contains('/') {
            links.push(href.to_string());
        }
        rest = &rest[end..];
    }

    links
}

/// Values of every `name: '...'` or `name: "..."` entry in a formats source file.
pub fn extract_format_names(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = source;

    while let Some(start) = rest.find("name:") {
        rest = rest[start + "name:".len()..].trim_start();
        let Some(quote) = rest.chars().next().filter(|c| *c == '\'' || *c == '"') else {
            continue;
        };
        rest = &rest[quote.len_utf8()..];
        let Some(end) = rest.find(['\'', '"']) else {
            break;
        };
        if end > 0 {
            names.push(rest[..end].to_string());
        }
        rest = &rest[end..];
    }

    names
}

//! CLI handlers for media browsing.

use crate::client::ApiClient;
use crate::config::AppConfig;
use crate::types::{Album, Page};

use super::default_credentials;

fn client(config: &AppConfig) -> Result<ApiClient, Box<dyn std::error::Error>> {
    Ok(ApiClient::from_config(config)?.with_credentials(default_credentials()))
}

fn print_albums(page: &Page<Album>) {
    for album in &page.items {
        println!(
            "{:>10}  {} - {} ({})",
            album.album_rating_key, album.album_artist, album.album_title, album.album_year
        );
    }
    if let Some(meta) = page.pagination {
        println!(
            "\npage {}/{} ({} albums)",
            meta.current_page, meta.total_pages, meta.total_records
        );
    }
}

/// Handle `prasaddys albums list`.
pub async fn handle_albums_list(
    config: &AppConfig,
    page: u32,
    limit: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let albums = client(config)?.fetch_albums(page, limit).await?;
    print_albums(&albums);
    Ok(())
}

/// Handle `prasaddys albums search`.
pub async fn handle_albums_search(
    config: &AppConfig,
    query: &str,
    page: u32,
    limit: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let albums = client(config)?.search_albums(query, page, limit).await?;
    if albums.is_empty() {
        println!("No albums match \"{query}\"");
        return Ok(());
    }
    print_albums(&albums);
    Ok(())
}

/// Handle `prasaddys youtube search`.
pub async fn handle_youtube_search(
    config: &AppConfig,
    query: &str,
    page_token: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = client(config)?.search_youtube(query, page_token).await?;
    for item in &results.items {
        let channel = item.snippet.channel_title.as_deref().unwrap_or("-");
        println!("{}  {}  [{channel}]", item.id(), item.snippet.title);
    }
    if let Some(next) = results.next_page_token {
        println!("\nmore: --page-token {next}");
    }
    Ok(())
}

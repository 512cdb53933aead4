use anyhow::Result;
use url::Url;

use zcomx_core::book::PageSource;
use zcomx_core::loader::{image_url, HttpImageFetcher};
use zcomx_core::AppConfig;

/// Print the page list of a book with the image URL of every page
pub async fn run(config: &AppConfig, source: &str, json: bool) -> Result<()> {
    let fetcher = HttpImageFetcher::new(&config.loader)?;
    let pages = PageSource::parse(source)?.load(fetcher.client()).await?;
    let base = Url::parse(&config.loader.base_url)?;

    if json {
        let entries = pages
            .iter()
            .map(|page| {
                Ok(serde_json::json!({
                    "page": page.index + 1,
                    "id": page.id,
                    "image": page.image,
                    "width": page.dimensions.map(|d| d.width),
                    "height": page.dimensions.map(|d| d.height),
                    "url": image_url(&base, &page.image, config.loader.image_size)?.to_string(),
                }))
            })
            .collect::<Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{:>5}  {:>8}  {:>11}  IMAGE", "PAGE", "ID", "SIZE");
    for page in pages.iter() {
        let size = page
            .dimensions
            .map(|d| format!("{}x{}", d.width, d.height))
            .unwrap_or_else(|| "-".to_string());
        let marker = if pages.is_indicia(page.index) { "  (indicia)" } else { "" };
        println!("{:>5}  {:>8}  {:>11}  {}{}", page.index + 1, page.id, size, page.image, marker);
    }
    println!("{} pages", pages.len());
    Ok(())
}

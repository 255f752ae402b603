/// Smoke-test for `DocumentFetcher` + `DomQuery` + `PublishPipeline`.
///
/// Fetches <https://example.com>, queries the page heading, builds a
/// one-record batch from it, and dry-runs the publish sequence against
/// a mock transport (no catalog is touched).
///
/// Run with:
///   cargo run --example scrape_smoke
use std::time::Duration;

use jobcast_client::{DocumentFetcher, DomQuery, PublishConfig, PublishPipeline};
use jobcast_core::models::{PublishBatch, Record};
use jobcast_core::testutil::MockTransport;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let url = "https://example.com";
    println!("Fetching {url} …");
    let mut fetcher = DocumentFetcher::new()?;
    if fetcher.load_url(url).is_none() {
        anyhow::bail!("fetch failed, see the warning above");
    }
    println!("HTTP status: {:?}", fetcher.last_status());

    let query = DomQuery::new(&fetcher)?;
    let heading = query
        .find_first("h1", &[])?
        .map(|h| h.text().collect::<String>())
        .unwrap_or_default();
    assert!(!heading.is_empty(), "Expected an <h1> on the page");
    println!("First <h1>: {heading}");

    let mut batch = PublishBatch::new("ExampleCo");
    batch.push(Record::with_generated_id(
        heading,
        url,
        "ExampleCo",
        "Romania",
        "Bucuresti",
    )?);

    // Dry-run the publish sequence against a mock transport.
    let mock = MockTransport::with_responses(vec![]);
    let mut config = PublishConfig::new("dry-run-key");
    config.propagation_delay = Duration::ZERO;
    PublishPipeline::with_transport(mock.clone(), config).publish(&batch)?;

    println!("Publish sequence ({} records):", batch.len());
    for called in mock.call_urls() {
        println!("  POST {called}");
    }
    Ok(())
}

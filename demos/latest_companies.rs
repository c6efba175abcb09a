//! Prints the five most recently added client corporations.
//!
//! ```sh
//! BULLHORN_CREDENTIALS=auth.json RUST_LOG=integrations_bullhorn=debug \
//!     cargo run --example latest_companies
//! ```

use chrono::DateTime;
use integrations_bullhorn::{
    BullhornClient, BullhornConfig, FileCredentialStore, QueryOptions, QueryPage,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::var("BULLHORN_CREDENTIALS").unwrap_or_else(|_| "auth.json".to_string());
    let store = FileCredentialStore::new(path);
    let client = BullhornClient::connect(BullhornConfig::from_env()?, store).await?;

    let options = QueryOptions::new()
        .fields([
            "id",
            "externalID",
            "name",
            "status",
            "businessSectorList",
            "industryList",
            "dateAdded",
        ])
        .sort("-dateAdded")
        .count(5);

    let page: QueryPage = client
        .search()
        .search("ClientCorporation", "(status:Client* OR status:Prospect)", &options)
        .await?;

    for company in &page.data {
        let added = company["dateAdded"]
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|at| at.to_rfc3339())
            .unwrap_or_default();
        let industries = company["industryList"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        println!(
            "{:>8}  {:<40}  {:<12}  {}  [{}]",
            company["id"],
            company["name"].as_str().unwrap_or(""),
            company["status"].as_str().unwrap_or(""),
            added,
            industries
        );
    }

    Ok(())
}

//! Civic code CSV loader.

use gloo_net::http::Request;
use lib_session::reference::CityDirectory;

/// Fetch and parse the civic code CSV served next to the app.
pub async fn load_city_directory(url: &str) -> Result<CityDirectory, String> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| format!("Failed to fetch {}: {:?}", url, e))?;

    if !response.ok() {
        return Err(format!("Failed to fetch {}: status {}", url, response.status()));
    }

    let text = response
        .text()
        .await
        .map_err(|e| format!("Failed to read {}: {:?}", url, e))?;

    let directory = CityDirectory::from_csv(&text);
    log::info!("Loaded {} municipalities from {}", directory.len(), url);
    Ok(directory)
}

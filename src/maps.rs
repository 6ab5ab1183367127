use std::path::Path;
use std::{env, fmt, io};

pub const MAP_DIR: &str = "static/maps";

#[derive(Debug)]
pub enum MapError {
    Http(reqwest::Error),
    Io(io::Error),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Http(e) => write!(f, "map fetch failed: {}", e),
            MapError::Io(e) => write!(f, "map write failed: {}", e),
        }
    }
}

impl From<reqwest::Error> for MapError {
    fn from(err: reqwest::Error) -> MapError {
        MapError::Http(err)
    }
}

impl From<io::Error> for MapError {
    fn from(err: io::Error) -> MapError {
        MapError::Io(err)
    }
}

fn api_key() -> Option<String> {
    env::var("MAPQUEST_API_KEY").ok().filter(|k| !k.is_empty())
}

/// MapQuest static-map URL for a location.
pub fn map_url(address: &str, city: &str, state: &str, key: &str) -> String {
    let base = format!("https://www.mapquestapi.com/staticmap/v5/map?key={}", key);
    let location = format!("{},{},{}", address, city, state);
    format!(
        "{}&center={}&size=@2x&zoom=15&locations={}",
        base, location, location
    )
}

/// Fetch the static map for a cafe and store it under `static/maps`.
/// Fetching is disabled when no API key is configured.
pub async fn save_map(id: i32, address: &str, city: &str, state: &str) -> Result<(), MapError> {
    let key = match api_key() {
        Some(key) => key,
        None => {
            log::debug!("MAPQUEST_API_KEY not set, skipping map for cafe {}", id);
            return Ok(());
        }
    };
    let url = map_url(address, city, state, &key);
    let bytes = reqwest::get(url)
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    std::fs::create_dir_all(MAP_DIR)?;
    std::fs::write(Path::new(MAP_DIR).join(format!("{}.jpg", id)), &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_url_centers_on_location() {
        let url = map_url("3966 24th St", "San Francisco", "CA", "KEY");
        assert!(url.starts_with("https://www.mapquestapi.com/staticmap/v5/map?key=KEY"));
        assert!(url.contains("&center=3966 24th St,San Francisco,CA"));
        assert!(url.contains("&zoom=15"));
        assert!(url.ends_with("&locations=3966 24th St,San Francisco,CA"));
    }
}

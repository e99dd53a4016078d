//! Trip image selection
//!
//! Uses up to two place photos when the capability returned any, otherwise builds
//! keyword image URLs from the destination name.

use reqwest::Url;
use tracing::debug;
use tripstore::TripImages;

const KEYWORD_IMAGE_BASE: &str = "https://source.unsplash.com/600x400/";

/// Keyword image URL; `stamp` defeats caching between otherwise identical queries
pub fn keyword_image_url(keywords: &str, stamp: i64) -> String {
    let mut url = match Url::parse(KEYWORD_IMAGE_BASE) {
        Ok(url) => url,
        Err(_) => return KEYWORD_IMAGE_BASE.to_string(),
    };
    url.set_query(Some(&format!("{}&t={}", keywords.replace('&', " "), stamp)));
    url.to_string()
}

/// Pick the main and travel images for a destination
pub fn select_images(destination: &str, photos: &[String], stamp: i64) -> TripImages {
    debug!(%destination, photo_count = photos.len(), "select_images: called");
    match photos {
        [first, rest @ ..] => TripImages {
            main: first.clone(),
            travel: rest.first().unwrap_or(first).clone(),
        },
        [] => TripImages {
            main: keyword_image_url(destination, stamp),
            travel: keyword_image_url(&format!("{} travel", destination), stamp + 1),
        },
    }
}

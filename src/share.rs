//! Share payload for a reel.

use thiserror::Error;
use url::Url;

use crate::feed::Reel;

pub const SHARE_TITLE: &str = "Awesome Reel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub message: String,
    pub url: Url,
    pub title: String,
}

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("reel {id} has an unusable video url: {source}")]
    InvalidUrl {
        id: String,
        #[source]
        source: url::ParseError,
    },
}

impl ShareRequest {
    pub fn for_reel(reel: &Reel) -> Result<Self, ShareError> {
        let url = Url::parse(&reel.video_url).map_err(|source| ShareError::InvalidUrl {
            id: reel.id.clone(),
            source,
        })?;
        Ok(ShareRequest {
            message: format!("Check out this reel: {}", url),
            url,
            title: SHARE_TITLE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Feed;

    #[test]
    fn request_carries_url_and_fixed_title() {
        let feed = Feed::bundled().unwrap();
        let reel = &feed.reels()[0];
        let request = ShareRequest::for_reel(reel).unwrap();
        assert_eq!(request.title, "Awesome Reel");
        assert_eq!(request.url.as_str(), reel.video_url);
        assert_eq!(request.message, format!("Check out this reel: {}", reel.video_url));
    }

    #[test]
    fn broken_url_is_an_error() {
        let mut reel = Feed::bundled().unwrap().reels()[0].clone();
        reel.video_url = "not a url".to_string();
        assert!(matches!(
            ShareRequest::for_reel(&reel),
            Err(ShareError::InvalidUrl { .. })
        ));
    }
}

//! Stream source resolution
//!
//! Turns the page's `liveurl` parameter into something playable: an HLS
//! manifest locator for the controller, or a YouTube video id for the
//! embed frame.

use crate::{types::StreamLocator, Error, Result};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1},
    combinator::opt,
    sequence::preceded,
    IResult, Parser,
};
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Query parameter carrying the stream URL
pub const STREAM_PARAM: &str = "liveurl";

/// Lenient decoder: padding optional, like the browser's `atob`
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const INVALID_HLS_URL: &str = "Invalid HLS stream URL format.";
const UNSUPPORTED_URL: &str = "Unsupported stream URL. Please provide a valid .m3u8 or YouTube URL.";

/// What the page should render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamSource {
    /// HLS manifest driven by the playback controller
    Adaptive { locator: StreamLocator },
    /// Third-party embed frame
    Embed { video_id: String },
}

impl StreamSource {
    /// Frame URL for embeds
    pub fn embed_url(&self) -> Option<String> {
        match self {
            StreamSource::Embed { video_id } => Some(format!(
                "https://www.youtube.com/embed/{}?autoplay=1&rel=0&modestbranding=1",
                video_id
            )),
            StreamSource::Adaptive { .. } => None,
        }
    }

    pub fn locator(&self) -> Option<&StreamLocator> {
        match self {
            StreamSource::Adaptive { locator } => Some(locator),
            StreamSource::Embed { .. } => None,
        }
    }
}

/// Resolve the raw `liveurl` parameter value
pub fn resolve_stream_param(param: Option<&str>) -> Result<StreamSource> {
    let raw = match param.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(Error::StreamNotStarted),
    };

    let candidate = decode_param(raw);
    debug!(candidate = %candidate, "Resolving stream parameter");

    if let Some(video_id) = youtube_video_id(&candidate) {
        return Ok(StreamSource::Embed { video_id });
    }

    let is_manifest = match Url::parse(&candidate) {
        Ok(url) => url.path().to_lowercase().ends_with(".m3u8"),
        Err(_) => candidate.to_lowercase().ends_with(".m3u8"),
    };

    if !is_manifest {
        return Err(Error::InvalidLocator(UNSUPPORTED_URL.to_string()));
    }

    StreamLocator::parse(&candidate)
        .map(|locator| StreamSource::Adaptive { locator })
        .map_err(|_| Error::InvalidLocator(INVALID_HLS_URL.to_string()))
}

/// Resolve from a full page URL, reading [`STREAM_PARAM`] from its query
pub fn resolve_page_url(page: &Url) -> Result<StreamSource> {
    let param = page
        .query_pairs()
        .find(|(key, _)| key == STREAM_PARAM)
        .map(|(_, value)| value.into_owned());

    resolve_stream_param(param.as_deref())
}

/// Page URL without query or fragment, for cleaning the address bar
pub fn clean_location(page: &Url) -> Url {
    let mut clean = page.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    clean
}

/// Parameters may arrive base64-encoded; fall back to the raw text
fn decode_param(raw: &str) -> String {
    LENIENT_BASE64
        .decode(raw)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| raw.to_string())
}

fn youtube_path(input: &str) -> IResult<&str, &str> {
    let (input, _) = opt(alt((tag("https://"), tag("http://")))).parse(input)?;
    let (input, _) = opt(tag("www.")).parse(input)?;
    let (input, _) = alt((
        preceded(
            tag("youtube.com/"),
            alt((tag("watch?v="), tag("embed/"), tag("live/"), tag("shorts/"))),
        ),
        tag("youtu.be/"),
    ))
    .parse(input)?;

    take_till1(|c: char| c == '?' || c == '&' || c.is_whitespace()).parse(input)
}

/// Extract the video id from watch, embed, live, shorts and short-link URLs.
///
/// The link may appear anywhere in the text, so subdomains such as `m.` and
/// surrounding words are accepted; the leftmost match wins.
pub fn youtube_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    url.char_indices()
        .find_map(|(start, _)| youtube_path(&url[start..]).ok())
        .map(|(_, id)| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_param_means_not_started() {
        assert_eq!(resolve_stream_param(None), Err(Error::StreamNotStarted));
        assert_eq!(resolve_stream_param(Some("  ")), Err(Error::StreamNotStarted));
    }

    #[test]
    fn test_plain_hls_url() {
        let source =
            resolve_stream_param(Some("https://cdn.example.com/live/index_4.m3u8?sig=abc")).unwrap();
        assert_eq!(
            source.locator().unwrap().as_str(),
            "https://cdn.example.com/live/index_4.m3u8?sig=abc"
        );
    }

    #[test]
    fn test_base64_hls_url() {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode("https://cdn.example.com/live/index_4.m3u8");
        let source = resolve_stream_param(Some(&encoded)).unwrap();
        assert_eq!(
            source.locator().unwrap().as_str(),
            "https://cdn.example.com/live/index_4.m3u8"
        );
    }

    #[test]
    fn test_youtube_forms() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=10",
            "youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/live/dQw4w9WgXcQ?si=x",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "m.youtube.com/watch?v=dQw4w9WgXcQ",
            "Live now: https://youtu.be/dQw4w9WgXcQ",
        ] {
            assert_eq!(youtube_video_id(url).as_deref(), Some("dQw4w9WgXcQ"), "{}", url);
        }
    }

    #[test]
    fn test_not_youtube() {
        assert_eq!(youtube_video_id("https://cdn.example.com/live/index_4.m3u8"), None);
        assert_eq!(youtube_video_id("https://vimeo.com/watch?v=123"), None);
    }

    #[test]
    fn test_embed_url() {
        let source = resolve_stream_param(Some("https://youtu.be/abc123")).unwrap();
        assert_eq!(
            source.embed_url().unwrap(),
            "https://www.youtube.com/embed/abc123?autoplay=1&rel=0&modestbranding=1"
        );
    }

    #[test]
    fn test_unsupported_and_invalid() {
        match resolve_stream_param(Some("https://cdn.example.com/video.mp4")) {
            Err(Error::InvalidLocator(msg)) => assert!(msg.starts_with("Unsupported stream URL")),
            other => panic!("unexpected: {:?}", other),
        }
        match resolve_stream_param(Some("not a url/index.m3u8")) {
            Err(Error::InvalidLocator(msg)) => assert_eq!(msg, INVALID_HLS_URL),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_page_url_and_cleanup() {
        let page = Url::parse(
            "https://player.example.com/?liveurl=https%3A%2F%2Fcdn%2Findex_4.m3u8%3Fsig%3Dabc",
        )
        .unwrap();
        let source = resolve_page_url(&page).unwrap();
        assert_eq!(source.locator().unwrap().as_str(), "https://cdn/index_4.m3u8?sig=abc");
        assert_eq!(clean_location(&page).as_str(), "https://player.example.com/");
    }
}

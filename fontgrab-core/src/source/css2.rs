//! Stylesheet endpoint adapter
//!
//! Queries the css2 stylesheet-generation endpoint for a family and
//! extracts the (style, weight) pairs it actually serves. The endpoint
//! blocks obviously automated traffic, so each attempt pairs a query
//! shape with an identity header; the attempt list is configuration
//! data, not branching logic, and is tried in order until one yields a
//! non-empty parse.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, warn};

use super::VariantSource;
use crate::config::Config;
use crate::ratelimit::RateLimiter;
use crate::variant::{self, Style, VariantFile, STANDARD_WEIGHTS};

const CSS2_BASE: &str = "https://fonts.googleapis.com/css2";

const CHROME_MAC_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const CHROME_LINUX_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/123.0 Safari/537.36";

/// Variants observed when every attempt fails. Downstream consumers
/// assume at least one variant exists, so this is never empty.
pub const FALLBACK_TOKENS: [&str; 2] = ["regular", "700"];

static FONT_WEIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"font-weight:\s*(\d+)").expect("valid regex"));
static FONT_STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"font-style:\s*(normal|italic)").expect("valid regex"));
static FACE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)font-style:\s*(normal|italic).*?font-weight:\s*(\d+)\s*;.*?src:[^;]*?url\(([^)]+)\)")
        .expect("valid regex")
});

/// Which weight/style cross a query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// Nine standard weights, upright and italic.
    Comprehensive,
    /// Weights 400 and 700 only, upright. Some families answer this when
    /// the comprehensive query comes back empty.
    Minimal,
}

/// One configured fetch attempt: a query shape plus the identity header
/// presented with it.
#[derive(Debug, Clone)]
pub struct QueryAttempt {
    pub shape: QueryShape,
    pub user_agent: &'static str,
}

fn default_attempts() -> Vec<QueryAttempt> {
    vec![
        QueryAttempt {
            shape: QueryShape::Comprehensive,
            user_agent: CHROME_MAC_UA,
        },
        QueryAttempt {
            shape: QueryShape::Minimal,
            user_agent: CHROME_MAC_UA,
        },
        QueryAttempt {
            shape: QueryShape::Comprehensive,
            user_agent: CHROME_LINUX_UA,
        },
    ]
}

/// Family names are ASCII words; the endpoint expects spaces as plus
/// signs in the query string.
fn encode_family(family: &str) -> String {
    family.replace(' ', "+")
}

fn css2_url(family: &str, shape: QueryShape) -> String {
    let family = encode_family(family);
    match shape {
        QueryShape::Comprehensive => {
            let weights: Vec<String> = STANDARD_WEIGHTS.iter().map(|w| w.to_string()).collect();
            let uprights: Vec<String> = weights.iter().map(|w| format!("0,{w}")).collect();
            let italics: Vec<String> = weights.iter().map(|w| format!("1,{w}")).collect();
            let pairs = [uprights, italics].concat().join(";");
            format!("{CSS2_BASE}?family={family}:ital,wght@{pairs}&display=swap")
        }
        QueryShape::Minimal => {
            format!("{CSS2_BASE}?family={family}:wght@400;700&display=swap")
        }
    }
}

/// Plain query without any axis specification; catches variable-font
/// single entries during file resolution.
fn css2_plain_url(family: &str) -> String {
    format!("{CSS2_BASE}?family={}&display=swap", encode_family(family))
}

/// Extract the sorted variant tokens a stylesheet response advertises.
///
/// Weight 400 maps to "regular" (plus "italic" when an italic style is
/// present at any weight), other weights to "{W}" and "{W}italic".
pub fn parse_variant_tokens(css: &str) -> Vec<String> {
    let mut weights: Vec<u16> = FONT_WEIGHT_RE
        .captures_iter(css)
        .filter_map(|c| c[1].parse().ok())
        .collect();
    weights.sort_unstable();
    weights.dedup();

    let has_italic = FONT_STYLE_RE
        .captures_iter(css)
        .any(|c| &c[1] == "italic");

    let mut tokens = Vec::new();
    for weight in weights {
        tokens.push(variant::token_for(Style::Normal, weight));
        if has_italic {
            tokens.push(variant::token_for(Style::Italic, weight));
        }
    }

    variant::sort_tokens(&mut tokens);
    tokens
}

/// Extract (style, weight, url) triples from the `@font-face` blocks of a
/// stylesheet response, deduplicated first-seen-wins by (style, weight).
pub fn parse_face_blocks(css: &str) -> Vec<VariantFile> {
    let files = FACE_BLOCK_RE
        .captures_iter(css)
        .filter_map(|c| {
            Some(VariantFile {
                style: Style::from_css(&c[1].to_ascii_lowercase())?,
                weight: c[2].parse().ok()?,
                url: c[3].trim_matches(['\'', '"']).to_string(),
            })
        })
        .collect();
    variant::dedup_variant_files(files)
}

/// Adapter over the stylesheet-generation endpoint.
#[derive(Debug)]
pub struct Css2Source {
    client: reqwest::Client,
    limiter: RateLimiter,
    attempts: Vec<QueryAttempt>,
    max_retries: u32,
    calls: u64,
}

impl Css2Source {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_attempts(config, default_attempts())
    }

    pub fn with_attempts(config: &Config, attempts: Vec<QueryAttempt>) -> anyhow::Result<Self> {
        if attempts.is_empty() {
            anyhow::bail!("Stylesheet source needs at least one query attempt");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

        Ok(Self {
            client,
            limiter: RateLimiter::new(config.css2_calls_per_second),
            attempts,
            max_retries: config.css2_max_retries,
            calls: 0,
        })
    }

    async fn fetch_css(&mut self, url: &str, user_agent: &str) -> reqwest::Result<String> {
        self.limiter.wait().await;
        self.calls += 1;

        let response = self
            .client
            .get(url)
            .header("User-Agent", user_agent)
            .header("Accept", "text/css,*/*;q=0.1")
            .header("Referer", "https://fonts.google.com/")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Cache-Control", "no-cache")
            .send()
            .await?
            .error_for_status()?;

        response.text().await
    }

    /// Fetch (style, weight, url) triples for a family's servable files,
    /// preferring the explicit comprehensive query and falling back to
    /// the plain endpoint. Empty on failure; the caller decides whether
    /// that is acceptable.
    pub async fn fetch_variant_files(&mut self, family: &str) -> Vec<VariantFile> {
        let user_agent = self.attempts[0].user_agent;
        let url = css2_url(family, QueryShape::Comprehensive);

        let mut files = match self.fetch_css(&url, user_agent).await {
            Ok(css) => parse_face_blocks(&css),
            Err(e) => {
                debug!("Comprehensive file query failed for {family}: {e}");
                Vec::new()
            }
        };

        if files.is_empty() {
            let url = css2_plain_url(family);
            files = match self.fetch_css(&url, user_agent).await {
                Ok(css) => parse_face_blocks(&css),
                Err(e) => {
                    debug!("Plain file query failed for {family}: {e}");
                    Vec::new()
                }
            };
        }

        files
    }
}

#[async_trait]
impl VariantSource for Css2Source {
    async fn resolve_variants(&mut self, family: &str) -> Vec<String> {
        for round in 0..self.max_retries {
            for attempt in self.attempts.clone() {
                let url = css2_url(family, attempt.shape);
                match self.fetch_css(&url, attempt.user_agent).await {
                    Ok(css) if css.contains("@font-face") => {
                        let tokens = parse_variant_tokens(&css);
                        if !tokens.is_empty() {
                            debug!("Found {} variants for {family}", tokens.len());
                            return tokens;
                        }
                    }
                    Ok(_) => {
                        debug!("Stylesheet response for {family} had no @font-face blocks");
                    }
                    Err(e) => {
                        debug!(
                            "Stylesheet attempt {:?} round {round} failed for {family}: {e}",
                            attempt.shape
                        );
                    }
                }
            }

            if round + 1 < self.max_retries {
                // Exponential backoff, base delay doubling each round.
                tokio::time::sleep(Duration::from_secs(1 << round)).await;
            }
        }

        warn!("Using fallback variants for {family}");
        FALLBACK_TOKENS.iter().map(|t| t.to_string()).collect()
    }

    fn calls(&self) -> u64 {
        self.calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_CSS: &str = r#"
/* latin */
@font-face {
  font-family: 'Lora';
  font-style: italic;
  font-weight: 400;
  font-display: swap;
  src: url(https://fonts.gstatic.com/s/lora/v37/it.woff2) format('woff2');
}
@font-face {
  font-family: 'Lora';
  font-style: normal;
  font-weight: 400;
  font-display: swap;
  src: url(https://fonts.gstatic.com/s/lora/v37/up.woff2) format('woff2');
}
@font-face {
  font-family: 'Lora';
  font-style: normal;
  font-weight: 700;
  font-display: swap;
  src: url(https://fonts.gstatic.com/s/lora/v37/bold.woff2) format('woff2');
}
"#;

    #[test]
    fn test_parse_variant_tokens() {
        let tokens = parse_variant_tokens(SAMPLE_CSS);
        assert_eq!(tokens, vec!["700", "italic", "regular", "700italic"]);
    }

    #[test]
    fn test_parse_variant_tokens_upright_only() {
        let css = "font-style: normal; font-weight: 400; font-weight: 500;";
        assert_eq!(parse_variant_tokens(css), vec!["500", "regular"]);
    }

    #[test]
    fn test_parse_variant_tokens_empty_css() {
        assert!(parse_variant_tokens("body { color: red }").is_empty());
    }

    #[test]
    fn test_parse_face_blocks() {
        let files = parse_face_blocks(SAMPLE_CSS);
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].style, Style::Italic);
        assert_eq!(files[0].weight, 400);
        assert_eq!(files[0].url, "https://fonts.gstatic.com/s/lora/v37/it.woff2");
        assert_eq!(files[2].token(), "700");
    }

    #[test]
    fn test_parse_face_blocks_dedups_repeated_pairs() {
        // Two subsets of the same face: the first URL wins.
        let css = format!("{SAMPLE_CSS}{SAMPLE_CSS}");
        let files = parse_face_blocks(&css);
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].url, "https://fonts.gstatic.com/s/lora/v37/it.woff2");
    }

    #[test]
    fn test_empty_attempt_list_is_rejected() {
        let config = Config::with_cache_dir(std::path::PathBuf::from("/tmp/fg-css2-test"));
        let err = Css2Source::with_attempts(&config, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("at least one query attempt"));
    }

    #[test]
    fn test_css2_url_shapes() {
        let url = css2_url("Open Sans", QueryShape::Comprehensive);
        assert!(url.starts_with("https://fonts.googleapis.com/css2?family=Open+Sans:ital,wght@"));
        assert!(url.contains("0,100;"));
        assert!(url.contains(";1,900"));
        assert!(url.ends_with("&display=swap"));

        let url = css2_url("Open Sans", QueryShape::Minimal);
        assert_eq!(
            url,
            "https://fonts.googleapis.com/css2?family=Open+Sans:wght@400;700&display=swap"
        );
    }
}

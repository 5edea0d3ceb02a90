use std::path::PathBuf;
use std::time::Duration;

/// Production CMS host.
pub const DEFAULT_SITE_URL: &str = "https://opleidingen.frissestart.nl";

/// How long a cached course list stays fresh after it was written.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Relative directory that holds the cache files.
pub const CACHE_DIR: &str = ".cache";

/// Cache key of the full course list.
pub const COURSES_CACHE_KEY: &str = "courses";

/// Timeout for every course fallback endpoint.
pub const FALLBACK_TIMEOUT: Duration = Duration::from_secs(8);

/// Timeout for the per-slug course endpoints.
pub const SLUG_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

pub const PAGES_PER_REQUEST: u32 = 100;

/// Upper bound on result pages read from one page listing, whatever
/// `X-WP-TotalPages` claims.
pub const MAX_RESULT_PAGES: u32 = 50;

/// Result pages fetched at the same time.
pub const PAGE_REQUEST_CONCURRENCY: usize = 4;

/// Maximum number of courses returned by the upcoming listing.
pub const UPCOMING_LIMIT: usize = 5;

/// Share of the maximum at which a course counts as nearly full.
pub const NEARLY_FULL_RATIO: f64 = 0.8;

pub const PLACEHOLDER_IMAGE: &str =
    "https://opleidingen.frissestart.nl/wp-content/uploads/2023/06/persoonlijke-ontwikkeling.jpg";
pub const DEFAULT_CATEGORY: &str = "Algemeen";
pub const DEFAULT_LOCATION: &str = "Online";
pub const PRICE_ON_REQUEST: &str = "Op aanvraag";
pub const DATE_TO_BE_DETERMINED: &str = "Nader te bepalen";
pub const DATE_FLEXIBLE: &str = "Flexibel";

/// Page slugs that never show up in the footer.
pub const FOOTER_EXCLUDED_SLUGS: [&str; 4] =
    ["privacy-policy", "contact", "home", "algemene-voorwaarden"];

/// Endpoints, timeouts and cache settings for one CMS host.
#[derive(Debug, Clone)]
pub struct CmsConfig {
    pub site_url: String,
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
    pub fallback_timeout: Duration,
    pub slug_lookup_timeout: Duration,
    /// Shared secret for the admin sync endpoint. `None` leaves it open.
    pub sync_api_key: Option<String>,
}

impl Default for CmsConfig {
    fn default() -> Self {
        CmsConfig::new(DEFAULT_SITE_URL)
    }
}

impl CmsConfig {
    pub fn new(site_url: &str) -> Self {
        CmsConfig {
            site_url: site_url.trim_end_matches('/').to_string(),
            cache_dir: PathBuf::from(CACHE_DIR),
            cache_ttl: CACHE_TTL,
            fallback_timeout: FALLBACK_TIMEOUT,
            slug_lookup_timeout: SLUG_LOOKUP_TIMEOUT,
            sync_api_key: None,
        }
    }

    /// Production endpoints; the sync secret comes from `SYNC_API_KEY`.
    pub fn from_env() -> Self {
        let mut config = CmsConfig::default();
        config.sync_api_key = std::env::var("SYNC_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        config
    }

    pub fn rest_api_url(&self) -> String {
        format!("{}/wp-json", self.site_url)
    }

    pub fn wp_api_url(&self) -> String {
        format!("{}/wp/v2", self.rest_api_url())
    }

    pub fn custom_api_url(&self) -> String {
        format!("{}/custom/v1", self.rest_api_url())
    }

    /// Reservation table; each row points at a course and a location.
    pub fn course_table_url(&self) -> String {
        format!("{}/opleidingen/table/opleidingen", self.wp_api_url())
    }

    pub fn course_details_url(&self) -> String {
        format!("{}/opleidingen/table/cursussen", self.wp_api_url())
    }

    pub fn locations_url(&self) -> String {
        format!("{}/opleidingen/table/locaties", self.wp_api_url())
    }

    /// Flat course endpoints, most specific first.
    pub fn course_fallback_urls(&self) -> Vec<String> {
        let rest = self.rest_api_url();
        vec![
            format!("{}/frisse-start/v1/opleidingen", rest),
            format!("{}/opleidingen", self.wp_api_url()),
            format!("{}/opleidingen", self.custom_api_url()),
            format!("{}/opleidingen/v1/all", rest),
            format!(
                "{}/wp-content/themes/frissestart/api/get-opleidingen.php",
                self.site_url
            ),
        ]
    }

    pub fn course_slug_urls(&self, slug: &str) -> Vec<String> {
        vec![
            push_segment(
                &format!("{}/frisse-start/v1/opleidingen", self.rest_api_url()),
                slug,
            ),
            format!("{}/opleidingen?slug={}", self.wp_api_url(), encode_query(slug)),
            push_segment(&format!("{}/opleidingen", self.custom_api_url()), slug),
        ]
    }

    pub fn pages_url(&self) -> String {
        format!("{}/pages", self.wp_api_url())
    }

    pub fn alternate_pages_url(&self) -> String {
        format!("{}/frisse-start/v1/pages", self.rest_api_url())
    }

    pub fn menu_urls(&self, location: &str) -> Vec<String> {
        let rest = self.rest_api_url();
        vec![
            push_segment(&format!("{}/menus/v1/locations", rest), location),
            push_segment(&format!("{}/wp-api-menus/v2/menu-locations", rest), location),
            push_segment(&format!("{}/menu", self.custom_api_url()), location),
        ]
    }
}

/// Form-encoded value for a query string.
pub fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// `base` with one percent-encoded path segment appended.
fn push_segment(base: &str, segment: &str) -> String {
    let Ok(mut url) = url::Url::parse(base) else {
        return format!("{}/{}", base, encode_query(segment));
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hang_off_the_site_url() {
        let config = CmsConfig::new("http://localhost:8080/");
        assert_eq!(config.wp_api_url(), "http://localhost:8080/wp-json/wp/v2");
        assert_eq!(
            config.course_table_url(),
            "http://localhost:8080/wp-json/wp/v2/opleidingen/table/opleidingen"
        );
        assert_eq!(config.course_fallback_urls().len(), 5);
        assert_eq!(
            config.menu_urls("primary")[0],
            "http://localhost:8080/wp-json/menus/v1/locations/primary"
        );
    }

    #[test]
    fn slugs_are_escaped_in_urls() {
        let config = CmsConfig::default();
        let urls = config.course_slug_urls("a b&c");
        assert!(urls[1].ends_with("/opleidingen?slug=a+b%26c"));
        assert!(urls[0].ends_with("/frisse-start/v1/opleidingen/a%20b&c"));
        assert!(urls[2].ends_with("/custom/v1/opleidingen/a%20b&c"));
    }

    #[test]
    fn path_segments_cannot_escape_their_parent() {
        let config = CmsConfig::new("http://localhost:8080");
        let urls = config.menu_urls("hoofd menu/2");
        assert_eq!(
            urls[0],
            "http://localhost:8080/wp-json/menus/v1/locations/hoofd%20menu%2F2"
        );
        assert_eq!(
            config.course_slug_urls("excel basis")[2],
            "http://localhost:8080/wp-json/custom/v1/opleidingen/excel%20basis"
        );
    }
}

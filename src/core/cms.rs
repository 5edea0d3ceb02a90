use std::sync::Arc;

use chrono::Local;
use futures::{StreamExt, TryStreamExt, stream};
use serde_json::Value;

use crate::config::{
    COURSES_CACHE_KEY, CmsConfig, FOOTER_EXCLUDED_SLUGS, MAX_RESULT_PAGES, PAGES_PER_REQUEST,
    PAGE_REQUEST_CONCURRENCY, encode_query,
};
use crate::core::cache::{CourseCache, FileCache};
use crate::core::prober::{Candidate, first_success, is_non_empty_array};
use crate::core::{dates, normalizer};
use crate::error::cms::CmsError;
use crate::http::client::{CmsHttp, JsonSource};
use crate::model::course::Course;
use crate::model::menu::Menu;
use crate::model::page::{Page, default_pages};
use crate::model::raw_course::{FallbackRawCourse, RawCourse, Record};
use crate::model::sync_report::SyncReport;

/// Entry point for everything the site reads from the CMS.
///
/// Fetchers never fail: an unreachable CMS yields empty lists, `None` or
/// built-in defaults, and the reason is logged.
pub struct Cms {
    config: CmsConfig,
    source: Arc<dyn JsonSource>,
    cache: Arc<dyn CourseCache>,
}

impl Cms {
    /// Live HTTP client and a file cache, both taken from `config`.
    pub fn new(config: CmsConfig) -> Result<Self, CmsError> {
        let source = Arc::new(CmsHttp::new()?);
        let cache = Arc::new(FileCache::new(config.cache_dir.clone(), config.cache_ttl));
        Ok(Cms::with_parts(config, source, cache))
    }

    pub fn with_parts(
        config: CmsConfig,
        source: Arc<dyn JsonSource>,
        cache: Arc<dyn CourseCache>,
    ) -> Self {
        Cms {
            config,
            source,
            cache,
        }
    }

    pub fn config(&self) -> &CmsConfig {
        &self.config
    }

    /// All courses, served from the cache while it is fresh.
    pub async fn courses(&self) -> Vec<Course> {
        if let Some(cached) = self.cache.get(COURSES_CACHE_KEY).await {
            match serde_json::from_value::<Vec<Course>>(cached) {
                Ok(courses) => {
                    log::debug!("serving {} courses from cache", courses.len());
                    return courses;
                }
                Err(err) => log::warn!("ignoring unreadable course cache: {}", err),
            }
        }
        self.refresh_courses().await
    }

    /// Fetches courses from the CMS and rewrites the cache.
    pub async fn refresh_courses(&self) -> Vec<Course> {
        let courses = self.fetch_courses().await;
        if courses.is_empty() {
            return courses;
        }
        match serde_json::to_value(&courses) {
            Ok(value) => self.cache.set(COURSES_CACHE_KEY, &value).await,
            Err(err) => log::warn!("could not serialize courses for the cache: {}", err),
        }
        courses
    }

    async fn fetch_courses(&self) -> Vec<Course> {
        log::info!("fetching courses from the course table");
        if let Some(courses) = self.fetch_primary_courses().await {
            log::info!("fetched {} courses from the course table", courses.len());
            return courses;
        }

        let candidates = Candidate::list(
            self.config.course_fallback_urls(),
            Some(self.config.fallback_timeout),
        );
        match first_success(self.source.as_ref(), &candidates, is_non_empty_array).await {
            Some(response) => {
                let rows = response.body.as_array().cloned().unwrap_or_default();
                let courses = normalizer::normalize_all(&normalizer::fallback_rows(&rows));
                log::info!("fetched {} courses from {}", courses.len(), response.url);
                courses
            }
            None => {
                log::error!("no valid course data found from any endpoint");
                Vec::new()
            }
        }
    }

    async fn fetch_primary_courses(&self) -> Option<Vec<Course>> {
        let url = self.config.course_table_url();
        let reservations = match self.source.get_json(&url, None).await {
            Ok(response) if is_non_empty_array(&response.body) => response.body,
            Ok(_) => {
                log::warn!("course table {} returned no rows", url);
                return None;
            }
            Err(err) => {
                log::warn!("course table {} failed: {}", url, err);
                return None;
            }
        };

        let detail_rows = self.lookup_rows(&self.config.course_details_url()).await;
        let location_rows = self.lookup_rows(&self.config.locations_url()).await;
        let details = normalizer::index_by_id(&detail_rows);
        let locations = normalizer::index_by_id(&location_rows);

        let rows = reservations.as_array().map(Vec::as_slice).unwrap_or_default();
        let raw = normalizer::join_primary(rows, &details, &locations);
        Some(normalizer::normalize_all(&raw))
    }

    /// Rows of an auxiliary table; a failing table joins as empty.
    async fn lookup_rows(&self, url: &str) -> Vec<Value> {
        match self.source.get_json(url, Some(self.config.fallback_timeout)).await {
            Ok(response) => match response.body {
                Value::Array(rows) => rows,
                _ => {
                    log::warn!("lookup table {} is not a list", url);
                    Vec::new()
                }
            },
            Err(err) => {
                log::warn!("lookup table {} failed: {}", url, err);
                Vec::new()
            }
        }
    }

    pub async fn course_by_slug(&self, slug: &str) -> Option<Course> {
        if let Some(course) = self.courses().await.into_iter().find(|c| c.slug == slug) {
            return Some(course);
        }

        let candidates = Candidate::list(
            self.config.course_slug_urls(slug),
            Some(self.config.slug_lookup_timeout),
        );
        let response = first_success(self.source.as_ref(), &candidates, |body| {
            single_row(body).is_some()
        })
        .await;
        let Some(mut record) = response.as_ref().and_then(|r| single_row(&r.body)) else {
            log::warn!("course {} not found", slug);
            return None;
        };
        if record.first(&["slug", "post_name"]).is_none() {
            record.0.insert("slug".to_string(), Value::String(slug.to_string()));
        }
        Some(normalizer::normalize(&RawCourse::Fallback(FallbackRawCourse(record))))
    }

    /// The next courses to start, at most five.
    pub async fn upcoming_courses(&self) -> Vec<Course> {
        dates::upcoming(self.courses().await, Local::now().date_naive())
    }

    /// Published pages, all result pages concatenated in order.
    pub async fn all_pages(&self) -> Vec<Page> {
        match self.fetch_page_listing().await {
            Ok(pages) => pages,
            Err(err) => {
                log::warn!("page listing failed ({}), trying alternate endpoint", err);
                self.fetch_alternate_pages().await
            }
        }
    }

    async fn fetch_page_listing(&self) -> Result<Vec<Page>, CmsError> {
        let first = self.source.get_json(&self.page_listing_url(1), None).await?;

        let mut total_pages = first.total_pages().unwrap_or(1);
        if total_pages > MAX_RESULT_PAGES {
            log::warn!(
                "page listing claims {} result pages, reading the first {}",
                total_pages,
                MAX_RESULT_PAGES
            );
            total_pages = MAX_RESULT_PAGES;
        }

        let mut responses = vec![first];
        if total_pages > 1 {
            log::info!("page listing spans {} result pages", total_pages);
            let rest: Vec<_> = stream::iter(2..=total_pages)
                .map(|n| {
                    let url = self.page_listing_url(n);
                    async move { self.source.get_json(&url, None).await }
                })
                .buffered(PAGE_REQUEST_CONCURRENCY)
                .try_collect()
                .await?;
            responses.extend(rest);
        }

        let mut pages = Vec::new();
        for response in responses {
            let parsed = parse_pages(&response.body)
                .ok_or_else(|| CmsError::unexpected_shape(&response.url))?;
            pages.extend(parsed);
        }
        log::info!("fetched {} pages", pages.len());
        Ok(pages)
    }

    fn page_listing_url(&self, page: u32) -> String {
        let mut url = self.config.pages_url();
        url.push_str(&format!("?per_page={}&status=publish", PAGES_PER_REQUEST));
        if page > 1 {
            url.push_str(&format!("&page={}", page));
        }
        url
    }

    async fn fetch_alternate_pages(&self) -> Vec<Page> {
        let url = self.config.alternate_pages_url();
        match self.source.get_json(&url, None).await {
            Ok(response) => parse_pages(&response.body).unwrap_or_else(|| {
                log::error!("alternate page endpoint {} returned no list", url);
                Vec::new()
            }),
            Err(err) => {
                log::error!("alternate page endpoint {} failed: {}", url, err);
                Vec::new()
            }
        }
    }

    /// Pages for the footer, falling back to a fixed set.
    pub async fn footer_pages(&self) -> Vec<Page> {
        let mut pages = self.all_pages().await;
        if pages.is_empty() {
            log::info!("no pages found, using default footer pages");
            pages = default_pages();
        }
        pages.retain(|page| !FOOTER_EXCLUDED_SLUGS.contains(&page.slug.as_str()));
        pages
    }

    pub async fn page_by_slug(&self, slug: &str) -> Option<Page> {
        let url = format!("{}?slug={}", self.config.pages_url(), encode_query(slug));
        match self.source.get_json(&url, None).await {
            Ok(response) => parse_pages(&response.body)?.into_iter().next(),
            Err(err) => {
                log::warn!("page {} failed: {}", slug, err);
                None
            }
        }
    }

    pub async fn page_by_id(&self, id: u64) -> Option<Page> {
        let url = format!("{}/{}", self.config.pages_url(), id);
        match self.source.get_json(&url, None).await {
            Ok(response) => serde_json::from_value(response.body)
                .inspect_err(|err| log::warn!("page {} is malformed: {}", id, err))
                .ok(),
            Err(err) => {
                log::warn!("page {} failed: {}", id, err);
                None
            }
        }
    }

    /// Navigation menu for a theme location, or the built-in menu.
    pub async fn menu_by_location(&self, location: &str) -> Menu {
        let candidates = Candidate::list(self.config.menu_urls(location), None);
        first_success(self.source.as_ref(), &candidates, |body| {
            Menu::from_value(body).is_some()
        })
        .await
        .and_then(|response| Menu::from_value(&response.body))
        .unwrap_or_else(|| {
            log::error!("no menu found for location {}", location);
            Menu::default()
        })
    }

    /// Course sync for the admin endpoint. `force` skips the cache read.
    pub async fn synchronize(&self, force: bool) -> SyncReport {
        log::info!("synchronizing courses (force: {})", force);
        let courses = if force {
            self.refresh_courses().await
        } else {
            self.courses().await
        };
        SyncReport::from_count(courses.len())
    }
}

/// Case-insensitive search over title and description plus an exact
/// category match; empty filters match everything.
pub fn filter_courses<'a>(courses: &'a [Course], search: &str, category: &str) -> Vec<&'a Course> {
    let needle = search.trim().to_lowercase();
    courses
        .iter()
        .filter(|course| {
            needle.is_empty()
                || course.title.to_lowercase().contains(&needle)
                || course.description.to_lowercase().contains(&needle)
        })
        .filter(|course| category.is_empty() || course.category == category)
        .collect()
}

/// Distinct categories in first-seen order.
pub fn categories(courses: &[Course]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for course in courses {
        if !seen.contains(&course.category) {
            seen.push(course.category.clone());
        }
    }
    seen
}

fn parse_pages(body: &Value) -> Option<Vec<Page>> {
    let rows = body.as_array()?;
    Some(
        rows.iter()
            .filter_map(|row| serde_json::from_value(row.clone()).ok())
            .collect(),
    )
}

/// A course object, or the first element of a course list.
fn single_row(body: &Value) -> Option<Record> {
    match body {
        Value::Array(rows) => rows.first().cloned().and_then(Record::from_value),
        Value::Object(_) => Record::from_value(body.clone()).filter(|row| !row.0.is_empty()),
        _ => None,
    }
}

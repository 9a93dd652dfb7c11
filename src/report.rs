//! Fly-shop fishing report scraper.
//!
//! Finds the newest post on the shop's report listing, pulls the article
//! text, and reduces it to a short summary plus the sentences that describe
//! what is happening on the water right now.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::Serialize;

use crate::config::ServiceConfig;
use crate::logging::{DataSource, log_source_failure};
use crate::model::CollaboratorError;

pub const REPORT_SOURCE: &str = "caddis";

const MAX_SUMMARY_LINES: usize = 5;
const MAX_HIGHLIGHTS: usize = 10;

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n|\. ").expect("valid line-break pattern"));

static TIME_INDICATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(currently|right now|this week|today|has been|we saw|were|are|is)\b")
        .expect("valid time-indicator pattern")
});

static FLY_ACTIVITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(caddis|mayfly|blue wing|stonefly|nymph|streamer|dry fly|emerging|hatching|rising|feeding|working|productive)\b",
    )
    .expect("valid fly-activity pattern")
});

/// The latest shop report, or why there isn't one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShopReport {
    Found {
        source: String,
        url: String,
        summary: String,
        highlights: Vec<String>,
    },
    NotFound {
        source: String,
        message: String,
    },
}

impl ShopReport {
    fn not_found(message: &str) -> Self {
        ShopReport::NotFound {
            source: REPORT_SOURCE.to_string(),
            message: message.to_string(),
        }
    }
}

// ============================================================================
// Text Extraction
// ============================================================================

fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    LINE_BREAK.split(text).map(str::trim).filter(|l| !l.is_empty())
}

/// First few mid-length lines of the article, joined back into prose.
pub fn summarize_content(text: &str) -> String {
    let lines: Vec<&str> = split_lines(text)
        .filter(|l| {
            let len = l.chars().count();
            len > 50 && len < 300
        })
        .take(MAX_SUMMARY_LINES)
        .collect();

    if lines.is_empty() {
        String::new()
    } else {
        format!("{}.", lines.join(". "))
    }
}

/// Lines that talk about current fly activity.
pub fn extract_present_observations(text: &str) -> Vec<String> {
    split_lines(text)
        .filter(|l| TIME_INDICATOR.is_match(l) && FLY_ACTIVITY.is_match(l))
        .take(MAX_HIGHLIGHTS)
        .map(str::to_string)
        .collect()
}

// ============================================================================
// HTML Parsing
// ============================================================================

fn parse_selector(s: &str) -> Result<Selector, CollaboratorError> {
    Selector::parse(s).map_err(|e| CollaboratorError::Parse(format!("selector '{}': {:?}", s, e)))
}

/// Link to the newest post on the listing page, resolved against `list_url`.
pub fn first_post_url(list_html: &str, list_url: &str) -> Result<Option<String>, CollaboratorError> {
    let document = Html::parse_document(list_html);
    let link_sel = parse_selector(".entry-title a")?;

    let Some(href) = document
        .select(&link_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
    else {
        return Ok(None);
    };

    let base = reqwest::Url::parse(list_url).map_err(|e| CollaboratorError::Parse(e.to_string()))?;
    let resolved = base.join(href).map_err(|e| CollaboratorError::Parse(e.to_string()))?;
    Ok(Some(resolved.to_string()))
}

/// Article text of a post page.
pub fn post_body_text(post_html: &str) -> Result<String, CollaboratorError> {
    let document = Html::parse_document(post_html);
    let body_sel = parse_selector(".entry-content")?;
    Ok(document
        .select(&body_sel)
        .map(|el| el.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n"))
}

// ============================================================================
// Fetching
// ============================================================================

fn get_text(client: &Client, url: &str) -> Result<String, CollaboratorError> {
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        return Err(CollaboratorError::Http(response.status().as_u16()));
    }
    Ok(response.text()?)
}

fn try_scrape(client: &Client, list_url: &str) -> Result<ShopReport, CollaboratorError> {
    let list_html = get_text(client, list_url)?;
    let Some(post_url) = first_post_url(&list_html, list_url)? else {
        return Ok(ShopReport::not_found("No recent report found."));
    };

    let body = post_body_text(&get_text(client, &post_url)?)?;
    Ok(ShopReport::Found {
        source: REPORT_SOURCE.to_string(),
        url: post_url,
        summary: summarize_content(&body),
        highlights: extract_present_observations(&body),
    })
}

/// Scrape the latest report. Failures are logged and reported as not found.
pub fn scrape_fly_shop(client: &Client, config: &ServiceConfig) -> ShopReport {
    match try_scrape(client, &config.report_list_url) {
        Ok(report) => report,
        Err(e) => {
            log_source_failure(DataSource::FlyShop, &config.report_list_url, "scrape_report", &e.to_string());
            ShopReport::not_found("Report unavailable.")
        }
    }
}

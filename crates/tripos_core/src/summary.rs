use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::highlights::{MAX_HIGHLIGHTS, extract_highlights};

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(天|日|days?|días?|jours?|дн|أيام|दिन|일)").expect("Invalid duration regex")
});
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})[-/](\d{1,2})[-/](\d{1,2})").expect("Invalid date regex"));
static TITLE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+)").expect("Invalid title regex"));
static SECTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##\s+(.+)").expect("Invalid section regex"));
static TITLE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(行程|旅行|旅程|Itinerary|Trip|Travel|Plan).*").expect("Invalid suffix regex")
});

const FALLBACK_DESTINATION: &str = "My Trip";

/// Everything the share card shows about one trip.
///
/// Built through [`TripSummaryBuilder`] or [`TripSummary::from_form`]; at most
/// four highlights are ever kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TripSummary {
    destination: String,
    duration_label: String,
    travelers: String,
    budget: String,
    pace_label: String,
    highlights: Vec<String>,
    share_url: String,
}

impl TripSummary {
    pub fn builder(destination: impl Into<String>) -> TripSummaryBuilder {
        TripSummaryBuilder {
            summary: TripSummary {
                destination: destination.into(),
                ..TripSummary::default()
            },
        }
    }

    /// Build a summary from the planning form and the generated itinerary.
    ///
    /// Highlights come from `explicit` when non-empty, otherwise from the
    /// itinerary, otherwise from the comma-separated interests field.
    pub fn from_form(
        form: &TripForm,
        markdown: &str,
        explicit: &[String],
        share_url: impl Into<String>,
    ) -> Self {
        let destination = if form.destination.trim().is_empty() {
            destination_from_markdown(markdown)
        } else {
            form.destination.trim().to_string()
        };

        let mut highlights: Vec<String> = explicit.to_vec();
        if highlights.is_empty() {
            highlights = extract_highlights(markdown);
        }
        if highlights.is_empty() {
            highlights = split_interests(&form.interests);
        }

        TripSummary::builder(destination)
            .duration_label(extract_duration(&form.dates))
            .travelers(form.travelers.trim())
            .budget(form.budget.trim())
            .pace_label(form.pace.trim())
            .highlights(highlights)
            .share_url(share_url)
            .build()
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn duration_label(&self) -> &str {
        &self.duration_label
    }

    pub fn travelers(&self) -> &str {
        &self.travelers
    }

    pub fn budget(&self) -> &str {
        &self.budget
    }

    pub fn pace_label(&self) -> &str {
        &self.pace_label
    }

    pub fn highlights(&self) -> &[String] {
        &self.highlights
    }

    pub fn share_url(&self) -> &str {
        &self.share_url
    }
}

pub struct TripSummaryBuilder {
    summary: TripSummary,
}

impl TripSummaryBuilder {
    pub fn duration_label(mut self, label: impl Into<String>) -> Self {
        self.summary.duration_label = label.into();
        self
    }

    pub fn travelers(mut self, travelers: impl Into<String>) -> Self {
        self.summary.travelers = travelers.into();
        self
    }

    pub fn budget(mut self, budget: impl Into<String>) -> Self {
        self.summary.budget = budget.into();
        self
    }

    pub fn pace_label(mut self, pace: impl Into<String>) -> Self {
        self.summary.pace_label = pace.into();
        self
    }

    pub fn highlights<I, S>(mut self, highlights: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.summary.highlights = highlights.into_iter().map(Into::into).collect();
        self
    }

    pub fn share_url(mut self, url: impl Into<String>) -> Self {
        self.summary.share_url = url.into();
        self
    }

    pub fn build(mut self) -> TripSummary {
        self.summary.highlights.truncate(MAX_HIGHLIGHTS);
        self.summary
    }
}

/// Raw planning form fields a summary is derived from.
#[derive(Debug, Clone, Default)]
pub struct TripForm {
    pub destination: String,
    pub dates: String,
    pub travelers: String,
    pub budget: String,
    pub pace: String,
    pub interests: String,
}

/// Travel pace options offered by the planning form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Slow,
    Moderate,
    Fast,
    Intense,
}

impl Pace {
    pub fn from_label(label: &str) -> Option<Pace> {
        match label.trim().to_lowercase().as_str() {
            "slow" => Some(Pace::Slow),
            "moderate" => Some(Pace::Moderate),
            "fast" => Some(Pace::Fast),
            "intense" => Some(Pace::Intense),
            _ => None,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Pace::Slow => "🐢",
            Pace::Moderate => "🚶",
            Pace::Fast => "🏃",
            Pace::Intense => "⚡",
        }
    }
}

/// Short trip length label from a free-form dates field.
///
/// Prefers an explicit "5 days" / "5天" style phrase; otherwise counts the
/// inclusive days between the first two ISO-like dates. Empty when neither is
/// present.
pub fn extract_duration(dates: &str) -> String {
    if let Some(found) = DURATION.find(dates) {
        return found.as_str().to_string();
    }

    let parsed: Vec<NaiveDate> = DATE
        .captures_iter(dates)
        .filter_map(|caps| {
            let year = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let day = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
        .take(2)
        .collect();

    match parsed.as_slice() {
        [start, end] => {
            let days = (*end - *start).num_days() + 1;
            if days > 0 { days.to_string() } else { String::new() }
        }
        _ => String::new(),
    }
}

/// Destination name from the itinerary's title heading, with trailing
/// "Itinerary"/"Trip"/"行程"-style words removed.
pub fn destination_from_markdown(markdown: &str) -> String {
    let title = TITLE_HEADING
        .captures(markdown)
        .or_else(|| SECTION_HEADING.captures(markdown))
        .map(|caps| TITLE_SUFFIX.replace(&caps[1], "").trim().to_string());

    match title {
        Some(title) if !title.is_empty() => title,
        _ => FALLBACK_DESTINATION.to_string(),
    }
}

fn split_interests(interests: &str) -> Vec<String> {
    interests
        .split([',', '，', '、'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_HIGHLIGHTS)
        .map(str::to_string)
        .collect()
}

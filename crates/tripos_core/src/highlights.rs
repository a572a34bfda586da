use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Most highlights a share card can show.
pub const MAX_HIGHLIGHTS: usize = 4;

const DAY_ONE_FRAGMENTS: usize = 3;
const DAY_ONE_LEN: std::ops::RangeInclusive<usize> = 3..=29;
const BULLET_LEN: std::ops::RangeInclusive<usize> = 5..=39;

/// "Day 1" section markers, English first, then localized forms.
static DAY_ONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(day\s*1|第[一1]天|1日目|1일차|día\s*1|jour\s*1)").expect("Invalid day marker regex")
});

/// Pull up to four short highlight strings out of an itinerary.
///
/// The line after the first "Day 1" marker is split on `|` and its first
/// three fragments are kept when 3 to 29 characters long. Remaining slots are
/// filled from bullet lines (`-` or `•`) with 5 to 39 characters of content,
/// skipping exact duplicates. Never fails; returns an empty list when nothing
/// matches.
pub fn extract_highlights(markdown: &str) -> Vec<String> {
    let mut highlights = day_one_fragments(markdown);

    if highlights.len() < MAX_HIGHLIGHTS {
        for bullet in bullet_fragments(markdown) {
            if highlights.len() >= MAX_HIGHLIGHTS {
                break;
            }
            if !highlights.contains(&bullet) {
                highlights.push(bullet);
            }
        }
    }

    highlights.truncate(MAX_HIGHLIGHTS);
    debug!(count = highlights.len(), "extracted highlights");
    highlights
}

fn day_one_fragments(markdown: &str) -> Vec<String> {
    let mut lines = markdown.lines();
    if !lines.by_ref().any(|line| DAY_ONE.is_match(line)) {
        return Vec::new();
    }
    let Some(activities) = lines.next() else {
        return Vec::new();
    };

    activities
        .split('|')
        .filter(|piece| !piece.is_empty())
        .take(DAY_ONE_FRAGMENTS)
        .map(|piece| {
            piece
                .chars()
                .filter(|c| !matches!(c, '*' | '#' | '-' | '|'))
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|cleaned| DAY_ONE_LEN.contains(&cleaned.chars().count()))
        .collect()
}

fn bullet_fragments(markdown: &str) -> impl Iterator<Item = String> + '_ {
    markdown.lines().filter_map(|line| {
        let content = line
            .trim()
            .strip_prefix('-')
            .or_else(|| line.trim().strip_prefix('•'))?
            .trim();
        BULLET_LEN
            .contains(&content.chars().count())
            .then(|| content.to_string())
    })
}

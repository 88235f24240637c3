//! Formatter for the weekly narrative text (`weatherProfile`).
//!
//! The source is one long Chinese free-text string. We normalize its
//! punctuation, mark keyword spans for three semantic categories, split it into
//! sentences and group them by an optional leading day reference ("28日" or
//! "28日、29日"). The result is an ordered entry list the display layer can
//! render directly, plus an HTML timeline-fragment renderer.

use regex::Regex;
use std::sync::LazyLock;

/// Shown when the feed carries no narrative at all.
pub const PLACEHOLDER: &str = "暫無概況資料";

/// Dateless sentences at or below this many characters are treated as noise
/// and dropped. Measured after highlighting, like the source behavior.
const MIN_NOTE_CHARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Cooling / rain risk: cold surge, rain phrases.
    Chill,
    /// Warming / clear sky.
    Warm,
    /// Large day-night temperature swing.
    Swing,
}

impl Category {
    pub fn css_class(self) -> &'static str {
        match self {
            Category::Chill => "highlight-cold",
            Category::Warm => "highlight-warm",
            Category::Swing => "highlight-warn",
        }
    }
}

// Patterns run until the next punctuation boundary, so a match never crosses a
// clause. The passes are independent: a later pass may wrap text an earlier
// pass already wrapped.
static HIGHLIGHTS: LazyLock<[(Category, Regex); 3]> = LazyLock::new(|| {
    [
        (
            Category::Chill,
            Regex::new("(東北季風[^,;，；。]*|轉涼|有雨|短暫雨|局部雨)").unwrap(),
        ),
        (Category::Warm, Regex::new("(氣溫[^,;，；。]*回升|晴)").unwrap()),
        (Category::Swing, Regex::new("(日夜溫差[^,;，；。]*)").unwrap()),
    ]
});

static DAY_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+日(?:、\d+日)?)").unwrap());

/// One formatted sentence: an optional day label plus its content, in original
/// sentence order. Content may carry category `<span>` marks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewEntry {
    pub day: Option<String>,
    pub content: String,
}

/// Semicolons terminate sentences in this feed; commas and colons are only
/// unified to their full-width forms. Idempotent.
pub fn normalize_punctuation(text: &str) -> String {
    text.replace(';', "。")
        .replace('；', "。")
        .replace(',', "，")
        .replace(':', "：")
}

fn apply_highlights(text: &str) -> String {
    let mut out = text.to_string();
    for (category, pattern) in HIGHLIGHTS.iter() {
        let replacement = format!("<span class='{}'>$1</span>", category.css_class());
        out = pattern.replace_all(&out, replacement.as_str()).into_owned();
    }
    out
}

/// Parse the raw narrative into ordered, date-grouped entries.
///
/// Empty or whitespace-only input yields exactly one placeholder entry, never
/// an empty sequence.
pub fn parse_overview(text: &str) -> Vec<OverviewEntry> {
    if text.trim().is_empty() {
        return vec![OverviewEntry {
            day: None,
            content: PLACEHOLDER.to_string(),
        }];
    }

    let normalized = normalize_punctuation(text);
    let highlighted = apply_highlights(&normalized);

    let mut entries = Vec::new();
    for candidate in highlighted.split('。') {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }

        if let Some(m) = DAY_LABEL.find(candidate) {
            let day = m.as_str().to_string();
            let mut content = candidate[m.end()..].trim_start();
            // One leading separator belongs to the day label, not the content.
            if let Some(rest) = content.strip_prefix('，').or_else(|| content.strip_prefix('、')) {
                content = rest.trim_start();
            }
            entries.push(OverviewEntry {
                day: Some(day),
                content: content.to_string(),
            });
        } else if candidate.chars().count() > MIN_NOTE_CHARS {
            entries.push(OverviewEntry {
                day: None,
                content: candidate.to_string(),
            });
        }
        // Short dateless candidates are dropped: they are connector noise, not
        // forecast content.
    }

    entries
}

/// Render entries as the timeline-card HTML fragment the dashboard embeds.
pub fn render_html(entries: &[OverviewEntry]) -> String {
    let mut parts = vec!["<div class='weather-card'>".to_string()];
    for entry in entries {
        let row = match &entry.day {
            Some(day) => format!(
                "<div class='timeline-row'><div class='date-pill'>{}</div><div class='content-text'>{}。</div></div>",
                day, entry.content
            ),
            None => format!(
                "<div class='timeline-row'><div class='content-text'>{}。</div></div>",
                entry.content
            ),
        };
        parts.push(row);
    }
    parts.push("</div>".to_string());
    parts.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_single_placeholder() {
        let entries = parse_overview("");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].day, None);
        assert_eq!(entries[0].content, PLACEHOLDER);

        assert_eq!(parse_overview("   "), entries);
    }

    #[test]
    fn punctuation_normalization_is_idempotent() {
        let raw = "北部多雲;南部晴朗,山區:有霧；其他";
        let once = normalize_punctuation(raw);
        let twice = normalize_punctuation(&once);
        assert_eq!(once, twice);
        assert_eq!(
            once.split('。').collect::<Vec<_>>(),
            twice.split('。').collect::<Vec<_>>()
        );
    }

    #[test]
    fn semicolons_split_sentences() {
        let entries = parse_overview("北部天氣穩定;南部雲量偏多");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "北部天氣穩定");
        assert_eq!(entries[1].content, "南部雲量偏多");
    }

    #[test]
    fn double_day_label_with_warm_and_swing_marks() {
        let entries = parse_overview("10日、11日，氣溫回升，日夜溫差大");
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.day.as_deref(), Some("10日、11日"));
        assert!(
            entry.content.contains("<span class='highlight-warm'>氣溫回升</span>"),
            "warm mark missing: {}",
            entry.content
        );
        assert!(
            entry.content.contains("<span class='highlight-warn'>日夜溫差大</span>"),
            "swing mark missing: {}",
            entry.content
        );
        // The separator after the day label is stripped, so content starts at
        // the first clause.
        assert!(entry.content.starts_with("<span class='highlight-warm'>"));
    }

    #[test]
    fn single_day_label_strips_one_separator() {
        let entries = parse_overview("28日、冷空氣南下轉涼");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].day.as_deref(), Some("28日"));
        assert!(entries[0].content.starts_with("冷空氣南下"));
    }

    #[test]
    fn chill_pattern_runs_to_punctuation_boundary() {
        let entries = parse_overview("25日，東北季風增強轉涼，請注意保暖");
        let content = &entries[0].content;
        assert!(
            content.contains("<span class='highlight-cold'>東北季風增強轉涼</span>"),
            "got: {content}"
        );
    }

    #[test]
    fn independent_passes_can_both_mark_one_sentence() {
        let entries = parse_overview("本週前期有雨轉晴，農友請留意");
        let content = &entries[0].content;
        assert!(content.contains("<span class='highlight-cold'>有雨</span>"));
        assert!(content.contains("<span class='highlight-warm'>晴</span>"));
    }

    #[test]
    fn short_dateless_candidates_are_dropped() {
        // Three characters without a day label or keyword: noise.
        let entries = parse_overview("好天氣。整週適合田間作業");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "整週適合田間作業");
    }

    #[test]
    fn sentence_order_is_preserved() {
        let entries = parse_overview("本週天氣多變。27日，短暫雨。28日，氣溫回升");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].day, None);
        assert_eq!(entries[1].day.as_deref(), Some("27日"));
        assert_eq!(entries[2].day.as_deref(), Some("28日"));
    }

    #[test]
    fn render_html_wraps_entries_in_card() {
        let entries = parse_overview("27日，短暫雨");
        let html = render_html(&entries);
        assert!(html.starts_with("<div class='weather-card'>"));
        assert!(html.ends_with("</div>"));
        assert!(html.contains("<div class='date-pill'>27日</div>"));
        assert!(html.contains("<span class='highlight-cold'>短暫雨</span>。"));
    }
}

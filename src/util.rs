use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

static EMOJI_REPLACER: LazyLock<gh_emoji::Replacer> = LazyLock::new(gh_emoji::Replacer::new);

/// Expand GitHub emoji shortcodes (e.g. `:tada:` → 🎉) in the given text.
///
/// Returns `Cow::Borrowed` when no shortcodes are found, avoiding allocation.
pub(crate) fn expand_emoji(text: &str) -> Cow<'_, str> {
    EMOJI_REPLACER.replace_all(text)
}

/// Cut `text` to at most `max_width` display columns, ending in `...` when cut.
pub(crate) fn truncate_label(text: &str, max_width: usize) -> Cow<'_, str> {
    if text.width() <= max_width {
        return Cow::Borrowed(text);
    }
    let budget = max_width.saturating_sub(3);
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let cw = c.width().unwrap_or(0);
        if width + cw > budget {
            break;
        }
        out.push(c);
        width += cw;
    }
    out.push_str("...");
    Cow::Owned(out)
}

/// Format a datetime as relative time (e.g., `"2h"`, `"3d"`, `"1w"`).
pub(crate) fn format_relative_time(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(dt);

    let minutes = duration.num_minutes();
    if minutes < 1 {
        return "now".to_owned();
    }
    if minutes < 60 {
        return format!("{minutes}m");
    }

    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{hours}h");
    }

    let days = duration.num_days();
    if days < 7 {
        return format!("{days}d");
    }
    if days < 30 {
        return format!("{}w", days / 7);
    }
    if days < 365 {
        return format!("{}mo", days / 30);
    }

    format!("{}y", days / 365)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn known_shortcode_is_expanded() {
        assert_eq!(expand_emoji(":tada:").as_ref(), "🎉");
    }

    #[test]
    fn text_without_shortcodes_is_unchanged() {
        let result = expand_emoji("Hello, world!");
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn short_label_is_borrowed() {
        assert!(matches!(truncate_label("acme/web#1 Fix", 58), Cow::Borrowed(_)));
    }

    #[test]
    fn long_label_is_cut_with_ellipsis() {
        let label = "x".repeat(80);
        let cut = truncate_label(&label, 58);
        assert_eq!(cut.len(), 58);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn wide_characters_count_double() {
        let cut = truncate_label("日本語のタイトルです", 9);
        assert_eq!(cut, "日本語...");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(format_relative_time(&now, now), "now");
        assert_eq!(format_relative_time(&(now - Duration::minutes(5)), now), "5m");
        assert_eq!(format_relative_time(&(now - Duration::hours(3)), now), "3h");
        assert_eq!(format_relative_time(&(now - Duration::days(2)), now), "2d");
    }
}

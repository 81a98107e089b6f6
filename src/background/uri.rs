use crate::state::data::IntervalClass;

/// Build the photo service URL for a theme, cadence and window size.
///
/// `https://source.unsplash.com/1920x1080/daily?nature` for the day
/// interval, `https://source.unsplash.com/1920x1080/?nature` otherwise
/// (a random photo on every request).
pub fn photo_url(base: &str, theme: &str, interval: IntervalClass, width: u32, height: u32) -> String {
    let base = base.trim().trim_end_matches('/');
    let cadence = match interval {
        IntervalClass::Day => "daily",
        IntervalClass::Minute | IntervalClass::Hour => "",
    };

    format!(
        "{}/{}x{}/{}?{}",
        base,
        width.max(1),
        height.max(1),
        cadence,
        query_terms(theme)
    )
}

/// Lowercased search terms joined by commas
fn query_terms(theme: &str) -> String {
    theme
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_photo_for_short_intervals() {
        let url = photo_url("https://source.unsplash.com", "nature", IntervalClass::Hour, 1920, 1080);
        assert_eq!(url, "https://source.unsplash.com/1920x1080/?nature");

        let url = photo_url("https://source.unsplash.com", "nature", IntervalClass::Minute, 800, 600);
        assert_eq!(url, "https://source.unsplash.com/800x600/?nature");
    }

    #[test]
    fn test_daily_photo() {
        let url = photo_url("https://source.unsplash.com/", "City", IntervalClass::Day, 1280, 720);
        assert_eq!(url, "https://source.unsplash.com/1280x720/daily?city");
    }

    #[test]
    fn test_theme_terms_and_degenerate_size() {
        let url = photo_url("http://localhost:8080", "  Snowy   Mountains ", IntervalClass::Hour, 0, 0);
        assert_eq!(url, "http://localhost:8080/1x1/?snowy,mountains");
    }
}

use chrono::{DateTime, Utc};

pub fn format_date_time(date_time: &DateTime<Utc>) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}

/// Keeps the first `max_words` whitespace separated words, appending an
/// ellipsis when something was cut.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return words.join(" ");
    }
    let mut truncated = words[..max_words].join(" ");
    truncated.push_str(" …");
    truncated
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_date_time() {
        let date_time = Utc.with_ymd_and_hms(2017, 9, 10, 10, 42, 32).unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:32");
    }

    #[test]
    fn test_truncate_words() {
        assert_eq!(truncate_words("one two  three", 5), "one two three");
        assert_eq!(truncate_words("one two three four", 2), "one two …");
        assert_eq!(truncate_words("", 2), "");
        assert_eq!(truncate_words("a\nb\tc", 3), "a b c");
    }
}

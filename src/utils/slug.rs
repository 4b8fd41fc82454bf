use chrono::{DateTime, Utc};

const MAX_TITLE_SLUG_LEN: usize = 100;

/// Lowercases, keeps `[a-z0-9 -]`, turns whitespace runs into `-` and collapses `-` runs.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch);
        } else if ch == '-' || ch.is_whitespace() {
            pending_dash = true;
        }
    }
    out
}

/// Title slug with a millisecond-clock suffix so reposted titles stay unique.
pub fn vacancy_slug(title: &str, now: DateTime<Utc>) -> String {
    let mut base = slugify(title);
    if base.len() > MAX_TITLE_SLUG_LEN {
        base.truncate(MAX_TITLE_SLUG_LEN);
        while base.ends_with('-') {
            base.pop();
        }
    }
    let millis = now.timestamp_millis().rem_euclid(1_000_000);
    format!("{}-{:06}", base, millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn strips_non_ascii_and_symbols() {
        assert_eq!(slugify("Rust/Go Developer (Senior)"), "rustgo-developer-senior");
        assert_eq!(slugify("Разработчик Rust"), "rust");
        assert_eq!(slugify("a - - b"), "a-b");
    }

    #[test]
    fn vacancy_slug_appends_last_six_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_123_456).unwrap();
        assert_eq!(vacancy_slug("Backend Engineer", now), "backend-engineer-123456");

        let early = Utc.timestamp_millis_opt(1_700_000_000_042).unwrap();
        assert!(vacancy_slug("QA", early).ends_with("-000042"));
    }

    #[test]
    fn vacancy_slug_truncates_long_titles() {
        let now = Utc::now();
        let title = "word ".repeat(60);
        let slug = vacancy_slug(&title, now);
        let (base, suffix) = slug.rsplit_once('-').unwrap();
        assert!(base.len() <= 100);
        assert!(!base.ends_with('-'));
        assert_eq!(suffix.len(), 6);
    }
}

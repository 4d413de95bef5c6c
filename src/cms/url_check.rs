use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlKind {
    Absolute,
    RootRelative,
    Anchor,
    Mailto,
    Tel,
}

/// Annotation for a link field. Never blocks input; the UI shows it next to
/// the field and offers `apply()` as a one-click repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UrlCheck {
    Empty,
    Valid { kind: UrlKind },
    Suggest { suggestion: String, reason: String },
    Invalid { reason: String },
}

impl UrlCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, UrlCheck::Valid { .. })
    }

    /// The corrected value, when there is one.
    pub fn apply(&self) -> Option<&str> {
        match self {
            UrlCheck::Suggest { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    fn suggest(suggestion: impl Into<String>, reason: &str) -> Self {
        UrlCheck::Suggest { suggestion: suggestion.into(), reason: reason.to_string() }
    }

    fn invalid(reason: &str) -> Self {
        UrlCheck::Invalid { reason: reason.to_string() }
    }
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s:/]+@[^@\s/]+\.[^@\s/]+$").expect("email pattern compiles"))
}

fn domain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^([a-z0-9-]+\.)+[a-z]{2,}(:\d{1,5})?([/?#]\S*)?$").expect("domain pattern compiles")
    })
}

fn scheme_typo_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(https?)[:/]+(.+)$").expect("scheme pattern compiles"))
}

fn relative_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_\-]+(/[A-Za-z0-9_\-./?=&%]*)?$").expect("path pattern compiles"))
}

pub fn is_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Digits of a phone-looking string, keeping a leading `+`.
pub fn phone_digits(value: &str) -> Option<String> {
    if !value.chars().all(|c| c.is_ascii_digit() || " +-().".contains(c)) {
        return None;
    }
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if !(8..=15).contains(&digits.len()) {
        return None;
    }
    let plus = if value.trim_start().starts_with('+') { "+" } else { "" };
    Some(format!("{}{}", plus, digits))
}

fn is_absolute_http(value: &str) -> bool {
    match Url::parse(value) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().map_or(false, |h| !h.is_empty()),
        Err(_) => false,
    }
}

pub fn check_url(input: &str) -> UrlCheck {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return UrlCheck::Empty;
    }
    if trimmed != input {
        return match check_trimmed(trimmed) {
            UrlCheck::Valid { .. } => UrlCheck::suggest(trimmed, "Remove the surrounding spaces."),
            other => other,
        };
    }
    check_trimmed(trimmed)
}

fn check_trimmed(value: &str) -> UrlCheck {
    let lower = value.to_lowercase();

    if let Some(anchor) = value.strip_prefix('#') {
        return if anchor.is_empty() || anchor.chars().any(char::is_whitespace) {
            UrlCheck::invalid("An anchor needs a name without spaces, e.g. #contato.")
        } else {
            UrlCheck::Valid { kind: UrlKind::Anchor }
        };
    }

    if let Some(rest) = value.strip_prefix("//") {
        return UrlCheck::suggest(format!("https://{}", rest), "Add the https: scheme.");
    }

    if value.starts_with('/') {
        return if value.chars().any(char::is_whitespace) {
            UrlCheck::invalid("Paths cannot contain spaces.")
        } else {
            UrlCheck::Valid { kind: UrlKind::RootRelative }
        };
    }

    if lower.starts_with("mailto:") {
        let address = &value["mailto:".len()..];
        let address = address.split('?').next().unwrap_or_default();
        return if is_email(address) {
            UrlCheck::Valid { kind: UrlKind::Mailto }
        } else {
            UrlCheck::invalid("The e-mail address after mailto: is not valid.")
        };
    }

    if lower.starts_with("tel:") {
        let number = &value["tel:".len()..];
        return match phone_digits(number) {
            Some(digits) if digits == number => UrlCheck::Valid { kind: UrlKind::Tel },
            Some(digits) => UrlCheck::suggest(format!("tel:{}", digits), "Remove separators from the phone number."),
            None => UrlCheck::invalid("The phone number after tel: is not valid."),
        };
    }

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return if is_absolute_http(value) {
            UrlCheck::Valid { kind: UrlKind::Absolute }
        } else {
            UrlCheck::invalid("The address is not a valid web URL.")
        };
    }

    if let Some(caps) = scheme_typo_regex().captures(value) {
        let scheme = caps[1].to_lowercase();
        let candidate = format!("{}://{}", scheme, &caps[2]);
        if is_absolute_http(&candidate) {
            return UrlCheck::suggest(candidate, "Fix the scheme separator (://).");
        }
    }

    if is_email(value) {
        return UrlCheck::suggest(format!("mailto:{}", value), "Looks like an e-mail address.");
    }

    if let Some(digits) = phone_digits(value) {
        return UrlCheck::suggest(format!("tel:{}", digits), "Looks like a phone number.");
    }

    if value.chars().any(char::is_whitespace) {
        return UrlCheck::invalid("Links cannot contain spaces.");
    }

    if domain_regex().is_match(value) {
        let candidate = format!("https://{}", value);
        if is_absolute_http(&candidate) {
            return UrlCheck::suggest(candidate, "Add https:// in front of the domain.");
        }
    }

    if relative_path_regex().is_match(value) {
        return UrlCheck::suggest(format!("/{}", value), "Internal paths start with /.");
    }

    UrlCheck::invalid("Use https://…, /path, #anchor, mailto: or tel:.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(value: &str) -> Option<UrlKind> {
        match check_url(value) {
            UrlCheck::Valid { kind } => Some(kind),
            _ => None,
        }
    }

    #[test]
    fn accepts_every_supported_scheme() {
        assert_eq!(kind("https://leiloes.example.com.br/imoveis?city=Rio"), Some(UrlKind::Absolute));
        assert_eq!(kind("/imoveis/123"), Some(UrlKind::RootRelative));
        assert_eq!(kind("#contato"), Some(UrlKind::Anchor));
        assert_eq!(kind("mailto:contato@example.com"), Some(UrlKind::Mailto));
        assert_eq!(kind("tel:+552130001234"), Some(UrlKind::Tel));
    }

    #[test]
    fn bare_domain_gets_https_suggestion() {
        let check = check_url("www.example.com.br/leiloes");
        assert_eq!(check.apply(), Some("https://www.example.com.br/leiloes"));
    }

    #[test]
    fn scheme_typos_are_repaired() {
        assert_eq!(check_url("https//example.com").apply(), Some("https://example.com"));
        assert_eq!(check_url("http:/example.com").apply(), Some("http://example.com"));
    }

    #[test]
    fn email_and_phone_near_misses() {
        assert_eq!(check_url("vendas@example.com").apply(), Some("mailto:vendas@example.com"));
        assert_eq!(check_url("+55 (21) 3000-1234").apply(), Some("tel:+552130001234"));
        assert_eq!(check_url("tel:21 3000-1234").apply(), Some("tel:2130001234"));
    }

    #[test]
    fn surrounding_spaces_suggest_trim() {
        assert_eq!(check_url("  /imoveis ").apply(), Some("/imoveis"));
    }

    #[test]
    fn relative_path_without_slash() {
        assert_eq!(check_url("imoveis/rio").apply(), Some("/imoveis/rio"));
    }

    #[test]
    fn garbage_is_invalid_and_empty_is_empty() {
        assert!(matches!(check_url("not a link"), UrlCheck::Invalid { .. }));
        assert!(matches!(check_url("https://"), UrlCheck::Invalid { .. }));
        assert_eq!(check_url("   "), UrlCheck::Empty);
        assert!(!check_url("#").is_valid());
    }
}

const TOKEN_PREFIX: &str = "uc";

/// `uc` followed by the id zero-padded to at least two digits. Wider ids keep
/// all their digits, so the token always parses back to the same id.
pub fn detail_token(id: u32) -> String {
    format!("{TOKEN_PREFIX}{id:02}")
}

/// Appends the detail token for `id`, replacing any existing trailing
/// `#...` component. A leading `#` does not count as trailing.
pub fn append_detail_token(fragment: &str, id: u32) -> String {
    format!("{}#{}", without_trailing(fragment), detail_token(id))
}

/// Removes a trailing `#uc<digits>` component and leaves everything else,
/// including a preceding `?query`, untouched.
pub fn strip_detail_token(fragment: &str) -> String {
    match trailing_token(fragment) {
        Some(_) => without_trailing(fragment).to_string(),
        None => fragment.to_string(),
    }
}

/// The use-case id named by a trailing `#uc<digits>` component.
pub fn parse_detail_token(fragment: &str) -> Option<u32> {
    trailing_token(fragment)?.parse().ok()
}

fn trailing_token(fragment: &str) -> Option<&str> {
    let index = trailing_index(fragment)?;
    let digits = fragment[index + 1..].strip_prefix(TOKEN_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    Some(digits)
}

fn without_trailing(fragment: &str) -> &str {
    match trailing_index(fragment) {
        Some(index) => &fragment[..index],
        None => fragment,
    }
}

fn trailing_index(fragment: &str) -> Option<usize> {
    fragment.rfind('#').filter(|index| *index > 0)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn pads_to_two_digits() {
        assert_eq!(detail_token(7), "uc07");
        assert_eq!(detail_token(42), "uc42");
        assert_eq!(detail_token(100), "uc100");
    }

    #[test]
    fn append_then_strip_preserves_query() {
        let base = "#/use-cases?industry=Insurance";
        let opened = append_detail_token(base, 7);
        assert_eq!(opened, "#/use-cases?industry=Insurance#uc07");
        assert_eq!(strip_detail_token(&opened), base);
    }

    #[test]
    fn append_replaces_existing_trailing_component() {
        assert_eq!(append_detail_token("#/use-cases#uc03", 12), "#/use-cases#uc12");
        assert_eq!(append_detail_token("#/use-cases#section", 1), "#/use-cases#uc01");
    }

    #[test]
    fn strip_ignores_foreign_trailing_components() {
        assert_eq!(strip_detail_token("#/use-cases#section"), "#/use-cases#section");
        assert_eq!(strip_detail_token("#/use-cases"), "#/use-cases");
        assert_eq!(strip_detail_token("#uc07"), "#uc07");
    }

    #[test]
    fn parses_only_well_formed_tokens() {
        assert_eq!(parse_detail_token("#/use-cases#uc07"), Some(7));
        assert_eq!(parse_detail_token("#/use-cases?technology=Power+Automate#uc100"), Some(100));
        assert_eq!(parse_detail_token("#/use-cases#uc"), None);
        assert_eq!(parse_detail_token("#/use-cases#uc7a"), None);
        assert_eq!(parse_detail_token("#/use-cases"), None);
    }

    proptest! {
        #[test]
        fn token_round_trips_for_any_id(id in any::<u32>()) {
            let opened = append_detail_token("#/use-cases?industry=Retail", id);
            prop_assert_eq!(parse_detail_token(&opened), Some(id));
            prop_assert_eq!(strip_detail_token(&opened), "#/use-cases?industry=Retail");
        }
    }
}

use std::collections::BTreeSet;

/// Scope requesting a refresh token.
pub const OFFLINE_ACCESS: &str = "offline_access";

/// Scope marking a request as OpenID Connect.
pub const OPENID: &str = "openid";

/// Split an OAuth `scope` parameter into distinct scope names.
pub fn parse_scope(scope: &str) -> BTreeSet<String> {
    scope.split_whitespace().map(str::to_string).collect()
}

/// Render scope names as a space-delimited `scope` parameter.
pub fn format_scope<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scope_drops_blanks_and_duplicates() {
        let parsed = parse_scope("  openid  profile openid\tapi1 ");
        assert_eq!(
            parsed.into_iter().collect::<Vec<_>>(),
            vec!["api1", "openid", "profile"]
        );
    }

    #[test]
    fn format_scope_round_trips_through_parse() {
        let formatted = format_scope(parse_scope("profile openid openid"));
        assert_eq!(formatted, "openid profile");
        assert_eq!(format_scope(Vec::<String>::new()), "");
    }
}

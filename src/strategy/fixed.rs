//! Fixed rule: always bet the configured tokens

pub fn next_bet(tokens: &[String]) -> Vec<String> {
    tokens.to_vec()
}

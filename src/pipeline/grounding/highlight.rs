use std::sync::LazyLock;

use regex::Regex;

/// Numbers, decimals and ratios such as `140`, `5.9`, `120/80`.
static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?(?:/\d+)?").unwrap());

/// Display form of a quote with numeric values emphasised in Markdown bold.
pub fn highlight_numbers(quote: &str) -> String {
    NUMERIC_TOKEN.replace_all(quote, "**$0**").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_numbers() {
        assert_eq!(highlight_numbers("K 5.9, BP 150/95"), "K **5.9**, BP **150/95**");
    }

    #[test]
    fn leaves_plain_text() {
        assert_eq!(highlight_numbers("no values here"), "no values here");
    }
}

//! Plain text from server-rendered fragments

use once_cell::sync::Lazy;
use regex::Regex;

static DROPPED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b.*?</(script|style)>").expect("valid pattern")
});
static BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(tr|p|div|li|h[1-6])>|<br\s*/?>").expect("valid pattern"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid pattern"));

/// Text content of `markup`, one line per block, blank lines dropped
///
/// Only the handful of entities the server templates emit are decoded.
#[must_use]
pub fn to_text(markup: &str) -> String {
    let markup = DROPPED.replace_all(markup, "");
    let markup = BREAK.replace_all(&markup, "\n");
    let text = TAG.replace_all(&markup, " ");

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.replace("&amp;", "&")
                .replace("&lt;", "<")
                .replace("&gt;", ">")
                .replace("&#34;", "\"")
                .replace("&#39;", "'")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_per_row() {
        let markup = r#"
            <table>
              <tr><td>#12</td><td>Ana Souza</td><td>pending</td></tr>
              <tr><td>#13</td><td>Bruno &amp; Cia</td><td>shipped</td></tr>
            </table>
        "#;
        assert_eq!(
            to_text(markup),
            "#12 Ana Souza pending\n#13 Bruno & Cia shipped"
        );
    }

    #[test]
    fn scripts_are_dropped() {
        let markup = "<div>Pedido #4</div><script>htmx.process(document.body)</script>";
        assert_eq!(to_text(markup), "Pedido #4");
    }
}

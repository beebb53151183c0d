use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").expect("placeholder pattern compiles")
    })
}

/// Substitute `{{key}}` placeholders with values from `variables`.
///
/// Values are inserted as-is; escape them first if they end up in markup.
/// Placeholders without a matching variable are left untouched.
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Simple HTML escape for user supplied text
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitutes_known_keys() {
        let out = render_template(
            "<h1>{{device_name}}</h1><p>{{ device_id }}</p>",
            &vars(&[("device_name", "Kitchen"), ("device_id", "AA:BB")]),
        );
        assert_eq!(out, "<h1>Kitchen</h1><p>AA:BB</p>");
    }

    #[test]
    fn test_unmatched_placeholders_stay_verbatim() {
        let out = render_template("{{a}} {{missing}}", &vars(&[("a", "1")]));
        assert_eq!(out, "1 {{missing}}");
    }

    #[test]
    fn test_repeated_placeholder() {
        let out = render_template("{{x}}-{{x}}", &vars(&[("x", "y")]));
        assert_eq!(out, "y-y");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let out = render_template("{{a}}", &vars(&[("a", "{{b}}"), ("b", "no")]));
        assert_eq!(out, "{{b}}");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }
}

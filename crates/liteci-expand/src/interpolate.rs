//! Template interpolation over merged configuration values.
//!
//! Three placeholders are substituted, each accepted with or without
//! inner padding: `{{.environment}}`, `{{.group}}`, `{{.component}}`.
//! Any `{{…}}` substring left after substitution is removed, and the
//! result is trimmed. Only string values are interpolated.

use regex::Regex;
use std::sync::OnceLock;

fn residual() -> &'static Regex {
    static RESIDUAL: OnceLock<Regex> = OnceLock::new();
    RESIDUAL.get_or_init(|| Regex::new(r"\{\{.*?\}\}").expect("valid residual pattern"))
}

/// Substitute the expansion placeholders in one string value.
pub fn render(value: &str, environment: &str, group: &str, component: &str) -> String {
    let substituted = value
        .replace("{{.environment}}", environment)
        .replace("{{ .environment }}", environment)
        .replace("{{.group}}", group)
        .replace("{{ .group }}", group)
        .replace("{{.component}}", component)
        .replace("{{ .component }}", component);

    residual().replace_all(&substituted, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_placeholders() {
        let out = render(
            "{{.component}}-{{.environment}}-{{.group}}",
            "prod",
            "platform",
            "web",
        );
        assert_eq!(out, "web-prod-platform");
    }

    #[test]
    fn accepts_padded_placeholders() {
        let out = render("{{ .environment }}/{{ .component }}", "prod", "", "web");
        assert_eq!(out, "prod/web");
    }

    #[test]
    fn strips_unknown_placeholders_and_trims() {
        let out = render("  {{.region}} value {{.zone}} ", "prod", "", "web");
        assert_eq!(out, "value");
    }

    #[test]
    fn no_braces_survive() {
        let out = render("a {{.component}} b {{weird   stuff}} c", "prod", "", "web");
        assert!(!out.contains("{{"));
        assert!(!out.contains("}}"));
        assert_eq!(out, "a web b  c");
    }

    #[test]
    fn plain_strings_pass_through() {
        assert_eq!(render("plain", "prod", "g", "c"), "plain");
    }
}

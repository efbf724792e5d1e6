//! Build metadata reported by `--version`.

/// Release version, preferring a value injected by the release build.
pub fn app_version() -> &'static str {
    normalize_version(option_env!("SPLASHSCREEN_CHANGER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION")))
}

/// Git commit injected by the release build, or `unknown`.
pub fn app_commit() -> &'static str {
    non_empty_or_unknown(option_env!("SPLASHSCREEN_CHANGER_COMMIT"))
}

/// Build date injected by the release build, or `unknown`.
pub fn app_date() -> &'static str {
    non_empty_or_unknown(option_env!("SPLASHSCREEN_CHANGER_BUILD_DATE"))
}

/// Multi-line block printed for `--version`.
pub fn version_report() -> String {
    format!(
        "splashscreen-changer\n|- Version: {}\n|- Commit: {}\n|- Build date: {}",
        app_version(),
        app_commit(),
        app_date()
    )
}

/// Strip the `v` prefix git tags carry.
fn normalize_version(raw: &str) -> &str {
    let raw = raw.trim();
    if raw.is_empty() {
        return "unknown";
    }
    raw.strip_prefix('v').unwrap_or(raw)
}

fn non_empty_or_unknown(value: Option<&'static str>) -> &'static str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tag_prefix() {
        assert_eq!(normalize_version("v1.0.0"), "1.0.0");
        assert_eq!(normalize_version("1.0.0"), "1.0.0");
        assert_eq!(normalize_version(""), "unknown");
    }

    #[test]
    fn missing_metadata_is_unknown() {
        assert_eq!(non_empty_or_unknown(None), "unknown");
        assert_eq!(non_empty_or_unknown(Some("")), "unknown");
        assert_eq!(non_empty_or_unknown(Some("2023-10-01")), "2023-10-01");
    }

    #[test]
    fn report_mentions_every_field() {
        let report = version_report();
        assert!(report.contains(app_version()));
        assert!(report.contains("Commit"));
        assert!(report.contains("Build date"));
    }
}

//! 项目与微服务名称规范化

use crate::constants::docker::SERVICE_PREFIX;
use unicode_normalization::UnicodeNormalization;

/// 规范化名称：小写、去除变音符号、去除非字母数字字符、去除首尾连字符
///
/// 结果只包含 `[a-z0-9-]`，且对结果再次调用不会改变它。
pub fn normalize_name(name: &str) -> String {
    let stripped: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_diacritic(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();

    stripped.trim_matches('-').to_string()
}

/// U+0300..U+036F 组合变音符号
fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// 微服务在 docker-compose.yml 中的服务名：`microservice-<name>`
pub fn compose_service_name(microservice: &str) -> String {
    format!("{SERVICE_PREFIX}{}", normalize_name(microservice))
}

/// 微服务容器名：`<project>-microservice-<name>`
pub fn container_name(project: &str, microservice: &str) -> String {
    format!(
        "{}-{}",
        normalize_name(project),
        compose_service_name(microservice)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_name("Auth"), "auth");
        assert_eq!(normalize_name("  Billing Service "), "billingservice");
        assert_eq!(normalize_name("user_profile-v2"), "userprofilev2");
    }

    #[test]
    fn test_normalize_strips_diacritics() {
        assert_eq!(normalize_name("Café"), "cafe");
        assert_eq!(normalize_name("Ñandú"), "nandu");
        assert_eq!(normalize_name("Übersicht"), "ubersicht");
    }

    #[test]
    fn test_normalize_trims_hyphens() {
        assert_eq!(normalize_name("--edge--"), "edge");
        assert_eq!(normalize_name("---"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Auth",
            "Crème Brûlée",
            "-lead-and-trail-",
            "日本語 api 2",
            "ALL CAPS_123",
            "",
            "Ωmega-Σ",
        ];

        for sample in samples {
            let once = normalize_name(sample);
            assert_eq!(normalize_name(&once), once, "input: {sample:?}");
            assert!(
                once.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "unexpected characters in {once:?}"
            );
            assert!(!once.starts_with('-') && !once.ends_with('-'));
        }
    }

    #[test]
    fn test_service_and_container_names() {
        assert_eq!(compose_service_name("Auth"), "microservice-auth");
        assert_eq!(container_name("Demo", "Billing"), "demo-microservice-billing");
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 页面信号测试
///
/// 关键字链接提取、平台识别和JavaScript渲染检测

#[cfg(test)]
mod tests {
    use sitescout::config::settings::JsDetectionSettings;
    use sitescout::domain::models::keywords::CAREER_KEYWORDS;
    use sitescout::domain::models::platform::{detect_platform, detect_platform_from_html, Platform};
    use sitescout::engines::js_detector::needs_javascript;
    use sitescout::utils::link_extractor::extract_keyword_links;

    fn keywords() -> Vec<String> {
        CAREER_KEYWORDS.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_keyword_links_are_harvested() {
        let html = r#"
            <a href="/careers">Careers</a>
            <a href="https://jobs.example.nl">Werk</a>
            <a href="/contact">Contact</a>
            <a href="mailto:jobs@example.nl">Mail jobs</a>
            <a href="/careers#top">Back to top</a>
        "#;
        let links = extract_keyword_links(html, "https://example.nl/", &keywords());
        assert_eq!(
            links,
            vec!["https://example.nl/careers", "https://jobs.example.nl/"]
        );
    }

    #[test]
    fn test_platform_detection() {
        assert_eq!(
            detect_platform("https://acme.recruitee.com/o/monteur"),
            Platform::Recruitee
        );
        assert_eq!(
            detect_platform("https://jobs.lever.co/acme"),
            Platform::Lever
        );
        assert_eq!(detect_platform("https://acme.nl/careers"), Platform::None);
        assert_eq!(
            detect_platform_from_html(r#"<div id="whr_embed_hook"></div>"#),
            Platform::Workable
        );
        assert_eq!(detect_platform_from_html("<p>No widgets</p>"), Platform::None);
    }

    #[test]
    fn test_javascript_detection() {
        let settings = JsDetectionSettings::default();
        assert!(needs_javascript("<html><body></body></html>", &settings));
        assert!(needs_javascript(
            r#"<html><body><div id="app"></div><script src="/app.js"></script></body></html>"#,
            &settings
        ));

        let long_text = "Plenty of server rendered text here. ".repeat(20);
        let rendered = format!(
            r#"<html><body><div id="root"></div><p>{}</p></body></html>"#,
            long_text
        );
        assert!(!needs_javascript(&rendered, &settings));
    }
}

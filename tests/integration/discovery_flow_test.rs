// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 发现流程集成测试
///
/// 用wiremock模拟公司站点，验证HTTP路径、浏览器回退和站点地图索引

#[cfg(test)]
mod tests {
    use crate::integration::helpers::*;
    use sitescout::domain::models::discovery::DiscoverySource;
    use sitescout::domain::models::platform::Platform;
    use sitescout::domain::services::discovery_service::DiscoveryEngine;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer};

    fn engine(browser: std::sync::Arc<StubBrowser>) -> DiscoveryEngine {
        let settings = settings_for_mock();
        DiscoveryEngine::new(acquirer_with(&settings, browser), settings.discovery)
    }

    #[tokio::test]
    async fn test_careers_page_found_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/careers"))
            .respond_with(html(careers_page(
                r#"<a href="/careers/backend">Backend engineer vacancy</a>"#,
            )))
            .mount(&server)
            .await;

        let browser = StubBrowser::new();
        let result = engine(browser.clone())
            .find_target_page(&domain_of(&server))
            .await
            .into_result()
            .expect("careers page should be found");

        assert_eq!(result.url, format!("{}/careers", server.uri()));
        assert_eq!(result.source, DiscoverySource::Heuristic);
        assert_eq!(result.platform, Platform::None);
        assert!(!result.used_browser);
        assert!(result.content.contains("Open positions"));
        assert_eq!(
            result.related_urls,
            vec![format!("{}/careers/backend", server.uri())]
        );
    }

    #[tokio::test]
    async fn test_shell_page_falls_back_to_browser() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/careers"))
            .respond_with(html(shell_page()))
            .mount(&server)
            .await;

        let browser = StubBrowser::with_pages(&[("/careers", careers_page(""))]);
        let result = engine(browser.clone())
            .find_target_page(&domain_of(&server))
            .await
            .into_result()
            .expect("rendered careers page should be found");

        assert_eq!(result.url, format!("{}/careers", server.uri()));
        assert!(result.used_browser);
        assert!(result.content.contains("Open positions"));
        // /careers plus the two missing candidates of the same batch
        assert_eq!(browser.calls(), 3);
    }

    #[tokio::test]
    async fn test_sitemap_index_expands_keyword_sitemap() {
        let server = MockServer::start().await;
        let uri = server.uri();

        Mock::given(method("GET"))
            .and(path("/sitemap_index.xml"))
            .respond_with(xml(format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
                <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                  <sitemap><loc>{uri}/page-sitemap.xml</loc></sitemap>
                  <sitemap><loc>{uri}/vacature-sitemap.xml</loc></sitemap>
                </sitemapindex>"#
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/page-sitemap.xml"))
            .respond_with(xml("<urlset/>".to_string()))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vacature-sitemap.xml"))
            .respond_with(xml(format!(
                "<urlset>\
                   <url><loc><![CDATA[{uri}/vacatures/monteur]]></loc></url>\
                   <url><loc>{uri}/vacatures</loc></url>\
                   <url><loc>{uri}/about</loc></url>\
                 </urlset>"
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/vacatures"))
            .respond_with(html(careers_page("")))
            .mount(&server)
            .await;

        let browser = StubBrowser::new();
        let result = engine(browser.clone())
            .find_target_page(&domain_of(&server))
            .await
            .into_result()
            .expect("sitemap candidate should be accepted");

        assert_eq!(result.url, format!("{uri}/vacatures"));
        assert_eq!(result.source, DiscoverySource::Sitemap);
        assert_eq!(result.related_urls, vec![format!("{uri}/vacatures/monteur")]);
        assert!(!result.related_urls.contains(&format!("{uri}/about")));
        assert_eq!(browser.calls(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_site_is_not_found() {
        let server = MockServer::start().await;
        let browser = StubBrowser::new();
        let outcome = engine(browser.clone())
            .find_target_page(&domain_of(&server))
            .await;

        assert!(!outcome.is_found());
        assert!(browser.calls() > 0);
    }
}

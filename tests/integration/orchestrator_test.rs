// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 编排流程集成测试
///
/// 验证结果通过共享主存储在多个实例之间复用，以及扫描的去重策略

#[cfg(test)]
mod tests {
    use crate::integration::helpers::*;
    use sitescout::application::use_cases::acquisition_use_case::{
        AcquisitionOutcome, AcquisitionUseCase,
    };
    use sitescout::infrastructure::cache::two_tier_cache::TwoTierCache;
    use sitescout::infrastructure::cache::{PrimaryStore, SystemClock};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer};

    fn use_case_with_primary(
        primary: Arc<SharedPrimary>,
        browser: Arc<StubBrowser>,
    ) -> AcquisitionUseCase {
        let settings = settings_for_mock();
        let cache = Arc::new(TwoTierCache::new(
            Some(primary as Arc<dyn PrimaryStore>),
            &settings.cache,
            Arc::new(SystemClock),
        ));
        AcquisitionUseCase::new(acquirer_with(&settings, browser), cache, &settings)
    }

    #[tokio::test]
    async fn test_outcome_is_shared_through_primary_store() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/werken-bij"))
            .respond_with(html(careers_page("")))
            .expect(1)
            .mount(&server)
            .await;

        let primary = Arc::new(SharedPrimary::default());
        let domain = domain_of(&server);

        let first = use_case_with_primary(primary.clone(), StubBrowser::new());
        let outcome = first.run(&domain).await.unwrap();
        first.shutdown().await;
        assert!(outcome.is_found());
        assert_eq!(primary.len(), 1);

        // a fresh instance has an empty local store and must read the primary
        let second = use_case_with_primary(primary.clone(), StubBrowser::new());
        assert_eq!(second.run(&format!("http://{}/", domain)).await.unwrap(), outcome);
        assert_eq!(primary.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_outcome_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(plain_page("Bakery", r#"<a href="/contact">Contact</a>"#)))
            .expect(1)
            .mount(&server)
            .await;

        let primary = Arc::new(SharedPrimary::default());
        let use_case = use_case_with_primary(primary.clone(), StubBrowser::new());
        let domain = domain_of(&server);

        assert_eq!(use_case.run(&domain).await.unwrap(), AcquisitionOutcome::NotFound);
        assert_eq!(use_case.run(&domain).await.unwrap(), AcquisitionOutcome::NotFound);
        assert_eq!(primary.len(), 1);
    }

    #[tokio::test]
    async fn test_department_scan_dedupes_by_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/careers"))
            .respond_with(html(careers_page(
                r#"<a href="/careers/engineering">Engineering</a>
                   <a href="/careers/sales">Sales</a>
                   <a href="/careers/finance">Finance</a>"#,
            )))
            .mount(&server)
            .await;
        for department in ["engineering", "sales", "finance"] {
            // finance mirrors the sales page
            let title = if department == "finance" { "sales" } else { department };
            Mock::given(method("GET"))
                .and(path(format!("/careers/{}", department)))
                .respond_with(html(plain_page(title, "")))
                .expect(1)
                .mount(&server)
                .await;
        }

        let browser = StubBrowser::new();
        let use_case = use_case_with_primary(Arc::new(SharedPrimary::default()), browser.clone());
        let pages = use_case.scan_departments(&domain_of(&server)).await;

        let urls: Vec<String> = pages.into_iter().map(|p| p.url).collect();
        assert_eq!(
            urls,
            vec![
                format!("{}/careers/engineering", server.uri()),
                format!("{}/careers/sales", server.uri()),
            ]
        );

        use_case.shutdown().await;
        use_case.shutdown().await;
        assert_eq!(browser.shutdowns.load(Ordering::SeqCst), 1);
    }
}

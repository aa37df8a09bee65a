// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置加载测试
///
/// 环境变量覆盖文件和内置默认值

#[cfg(test)]
mod tests {
    use sitescout::config::settings::Settings;
    use std::io::Write;

    #[test]
    fn test_environment_overrides_file_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("local.toml")).unwrap();
        writeln!(
            file,
            r#"
[discovery]
batch_size = 5

[orchestrator]
page_delay_ms = 300
"#
        )
        .unwrap();

        std::env::set_var("SITESCOUT__ORCHESTRATOR__PAGE_DELAY_MS", "50");
        std::env::set_var("SITESCOUT__DISCOVERY__KEYWORDS", "jobs,vacatures");
        let base = dir.path().join("local").to_string_lossy().to_string();
        let settings = Settings::from_sources(&[base]);
        std::env::remove_var("SITESCOUT__ORCHESTRATOR__PAGE_DELAY_MS");
        std::env::remove_var("SITESCOUT__DISCOVERY__KEYWORDS");

        let settings = settings.expect("layered config should load");
        assert_eq!(settings.discovery.batch_size, 5);
        assert_eq!(settings.orchestrator.page_delay_ms, 50);
        assert_eq!(settings.orchestrator.page_delay().as_millis(), 50);
        assert_eq!(settings.discovery.keywords, vec!["jobs", "vacatures"]);
        assert_eq!(settings.acquisition.browser_timeout_secs, 35);
    }
}

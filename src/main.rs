// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use clap::Parser;
use sitescout::application::use_cases::acquisition_use_case::AcquisitionUseCase;
use sitescout::config::settings::Settings;
use sitescout::utils::telemetry;
use tracing::info;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(
    name = "sitescout",
    version,
    about = "Find and normalize the target page of a company website"
)]
struct Cli {
    /// 公司域名，例如 example.nl
    domain: String,

    /// 扫描首页和代表性内容页，而不是查找目标页面
    #[arg(long, conflicts_with = "departments")]
    site: bool,

    /// 抓取目标页面链接到的部门页面
    #[arg(long)]
    departments: bool,

    /// 站点扫描的最大页面数
    #[arg(long)]
    max_pages: Option<usize>,
}

/// 主函数
///
/// 初始化日志和配置，执行一次编排并以JSON输出结果
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();
    let cli = Cli::parse();

    let settings = Settings::new()?;
    info!("Configuration loaded");

    let use_case = AcquisitionUseCase::from_settings(&settings);

    let output = if cli.site {
        let max_pages = cli.max_pages.unwrap_or(settings.orchestrator.max_site_pages);
        use_case
            .scan_site(&cli.domain, max_pages)
            .await
            .map(|report| serde_json::to_string_pretty(&report))
    } else if cli.departments {
        Ok(serde_json::to_string_pretty(
            &use_case.scan_departments(&cli.domain).await,
        ))
    } else {
        use_case
            .run(&cli.domain)
            .await
            .map(|outcome| serde_json::to_string_pretty(&outcome))
    };

    use_case.shutdown().await;
    println!("{}", output??);
    Ok(())
}

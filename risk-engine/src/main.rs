use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use common::config::RiskThresholds;
use common::messages::{AnalysisRequest, AnalysisSummary};
use common::types::RiskResult;
use risk_engine::RiskEngine;

/// 税务稽查风险评估：读取 JSON 请求，输出评估结果
#[derive(Debug, Parser)]
#[command(name = "risk-eval")]
#[command(version, about, long_about = None)]
struct Args {
    /// 阈值配置文件（TOML），缺省使用内置行业基准
    #[arg(long)]
    thresholds: Option<PathBuf>,

    /// 请求文件，缺省或 "-" 时读 stdin
    input: Option<String>,
}

#[derive(Serialize)]
struct Output<'a> {
    result: &'a RiskResult,
    summary: AnalysisSummary,
}

fn read_body(input: Option<&str>) -> Result<String> {
    match input {
        None | Some("-") => {
            let mut body = String::new();
            io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read request from stdin")?;
            Ok(body)
        }
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file: {}", path)),
    }
}

fn main() -> Result<()> {
    // 日志写到 stderr，stdout 只输出结果
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let thresholds = match &args.thresholds {
        Some(path) => RiskThresholds::load(path)?,
        None => {
            warn!("No thresholds file given, using built-in industry standards");
            RiskThresholds::default()
        }
    };

    let body = read_body(args.input.as_deref())?;
    let request = AnalysisRequest::from_json(&body).context("Invalid analysis request")?;

    info!("Evaluating analysis request with {} fields", request.raw().len());

    let engine = RiskEngine::new(&thresholds);
    let result = engine.evaluate(request.raw());

    let output = Output {
        summary: AnalysisSummary::from(&result),
        result: &result,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

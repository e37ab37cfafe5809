use cert_points::{cli, config, error, fetcher, load_catalog, ocr, pipeline, record, scanner};
use cert_points_common::{assess, Catalog, MatchedSet};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use fetcher::HttpFetcher;
use indicatif::{ProgressBar, ProgressStyle};
use ocr::{OcrCache, PreprocessOptions, TesseractCli};
use pipeline::{CycleSummary, Pipeline, PipelineOptions};
use record::{JsonFileSource, PostgrestSource, RecordSource};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

enum Mode {
    Forever(Duration),
    Once { student: Option<String> },
}

/// フォルダ一括採点の1件分
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanEntry {
    file_name: String,
    file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<u32>,
    matched: MatchedSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { interval } => {
            let catalog = load_catalog(cli.catalog.as_deref(), &config)?;
            let poll = interval.map(Duration::from_secs).unwrap_or_else(|| config.poll_interval());
            dispatch(cli.records, &config, catalog, Mode::Forever(poll)).await?;
        }

        Commands::Once { student } => {
            let catalog = load_catalog(cli.catalog.as_deref(), &config)?;
            dispatch(cli.records, &config, catalog, Mode::Once { student }).await?;
        }

        Commands::Score { image } => {
            let catalog = load_catalog(cli.catalog.as_deref(), &config)?;
            let engine = TesseractCli::from_config(&config);
            let bytes = std::fs::read(&image)?;
            let raw_text = ocr::extract_text(&bytes, &engine, &PreprocessOptions::from(&config)).await?;
            let assessment = assess(&raw_text, &catalog);

            println!("📄 {}", image.display());
            println!("  テキスト: {}", assessment.normalized_text);
            println!("  カテゴリ: {:?}", assessment.matched);
            println!("  ポイント: {}", assessment.score);
        }

        Commands::Text { words } => {
            let catalog = load_catalog(cli.catalog.as_deref(), &config)?;
            let assessment = assess(&words.join(" "), &catalog);
            println!("{}", serde_json::to_string_pretty(&assessment)?);
        }

        Commands::Scan { folder, recursive, output } => {
            let catalog = load_catalog(cli.catalog.as_deref(), &config)?;
            let images = scanner::scan_folder(&folder, recursive)?;
            println!("✔ {}枚の画像を検出", images.len());

            let entries = scan_images(&images, &config, &catalog).await?;
            let json = serde_json::to_string_pretty(&entries)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("✔ 結果を保存: {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Catalog => {
            let catalog = load_catalog(cli.catalog.as_deref(), &config)?;
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key, cli.config.as_deref())?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  Supabase URL: {}", config.supabase_url.as_deref().unwrap_or("未設定"));
                println!("  APIキー: {}", if config.api_key.is_some() { "設定済み" } else { "未設定" });
                println!("  テーブル: {}", config.table);
                println!("  ポーリング間隔: {}秒", config.poll_interval_secs);
                println!("  tesseract: {} (--psm {})", config.tesseract_cmd, config.page_seg_mode);
                println!("  二値化閾値: {}", config.binarize_threshold);
                println!(
                    "  カタログ: {}",
                    config
                        .catalog_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "組み込み".into())
                );
            }
        }

        Commands::Cache { clear } => match &config.ocr_cache_dir {
            Some(dir) => {
                if clear {
                    match OcrCache::clear(dir)? {
                        true => println!("✔ キャッシュを削除しました: {}", OcrCache::cache_path(dir).display()),
                        false => println!("キャッシュファイルが存在しません"),
                    }
                } else {
                    let cache = OcrCache::load(dir);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", OcrCache::cache_path(dir).display());
                    println!("  件数: {}", cache.len());
                }
            }
            None => println!("ocr_cache_dir が設定されていません"),
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .try_init();
}

/// レコードソースを選んでパイプラインを起動
async fn dispatch(records: Option<PathBuf>, config: &Config, catalog: Catalog, mode: Mode) -> Result<()> {
    match records.or_else(|| config.records_file.clone()) {
        Some(path) => run_pipeline(JsonFileSource::new(&path), config, catalog, mode).await,
        None => run_pipeline(PostgrestSource::from_config(config)?, config, catalog, mode).await,
    }
}

async fn run_pipeline<S: RecordSource>(source: S, config: &Config, catalog: Catalog, mode: Mode) -> Result<()> {
    let fetcher = HttpFetcher::new(config.fetch_timeout())?;
    let engine = TesseractCli::from_config(config);
    let mut pipeline = Pipeline::new(source, fetcher, engine, catalog, PipelineOptions::from(config));
    if let Some(dir) = &config.ocr_cache_dir {
        pipeline = pipeline.with_cache(dir.clone());
    }

    match mode {
        Mode::Forever(interval) => {
            println!("🚀 新しい証明書を待機中...（Ctrl-Cで停止）");
            let cycles = pipeline.run_forever(interval).await;
            println!("\n✅ 停止しました（{}サイクル）", cycles);
        }
        Mode::Once { student } => {
            if let Some(student_id) = &student {
                pipeline = pipeline.with_student(student_id);
            }
            let outcomes = pipeline.run_once().await;
            let summary = CycleSummary::from_outcomes(&outcomes);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "summary": summary,
                    "records": outcomes,
                }))?
            );
        }
    }

    Ok(())
}

async fn scan_images(
    images: &[scanner::ImageInfo],
    config: &Config,
    catalog: &Catalog,
) -> Result<Vec<ScanEntry>> {
    let engine = TesseractCli::from_config(config);
    let options = PreprocessOptions::from(config);

    let pb = ProgressBar::new(images.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .map_err(|e| error::CertPointsError::Config(e.to_string()))?
            .progress_chars("=> "),
    );

    let mut entries = Vec::with_capacity(images.len());
    for image in images {
        pb.set_message(image.file_name.clone());

        let result = match std::fs::read(&image.path) {
            Ok(bytes) => ocr::extract_text(&bytes, &engine, &options).await,
            Err(e) => Err(e.into()),
        };

        let entry = match result {
            Ok(raw_text) => {
                let assessment = assess(&raw_text, catalog);
                ScanEntry {
                    file_name: image.file_name.clone(),
                    file_path: image.path.display().to_string(),
                    score: Some(assessment.score),
                    matched: assessment.matched,
                    error: None,
                }
            }
            Err(e) => ScanEntry {
                file_name: image.file_name.clone(),
                file_path: image.path.display().to_string(),
                score: None,
                matched: MatchedSet::new(),
                error: Some(e.to_string()),
            },
        };
        entries.push(entry);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(entries)
}

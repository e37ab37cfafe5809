use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cert-points")]
#[command(about = "証明書画像OCR・活動ポイント自動採点ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（デフォルト: ~/.config/cert-points/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// レコードJSONファイル（指定時はSupabaseの代わりに使用）
    #[arg(long, global = true)]
    pub records: Option<PathBuf>,

    /// カテゴリカタログJSON（省略時は設定値または組み込みカタログ）
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 新しい証明書を待機して継続的に採点
    Run {
        /// ポーリング間隔（秒、省略時は設定値）
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// 未処理の証明書を1サイクルだけ採点し、結果をJSONで出力
    Once {
        /// 指定学生の証明書のみ採点
        #[arg(long)]
        student: Option<String>,
    },

    /// ローカルの証明書画像を採点（書き込みなし）
    Score {
        /// 画像ファイル
        #[arg(required = true)]
        image: PathBuf,
    },

    /// テキストを直接採点（OCRなし）
    Text {
        /// 採点するテキスト
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// フォルダ内の証明書画像を一括採点（書き込みなし）
    Scan {
        /// 画像フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// サブフォルダも再帰的にスキャン
        #[arg(short, long)]
        recursive: bool,

        /// 結果JSONの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 使用中のカテゴリカタログを表示
    Catalog,

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// OCRキャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_text_words() {
        let cli = Cli::parse_from(["cert-points", "text", "nptel", "8", "week"]);
        match cli.command {
            Commands::Text { words } => assert_eq!(words, vec!["nptel", "8", "week"]),
            _ => panic!("text サブコマンドになっていない"),
        }
    }

    #[test]
    fn test_parse_global_records_flag() {
        let cli = Cli::parse_from(["cert-points", "once", "--records", "r.json", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.records, Some(PathBuf::from("r.json")));
        assert!(matches!(cli.command, Commands::Once { student: None }));
    }

    #[test]
    fn test_parse_once_for_student() {
        let cli = Cli::parse_from(["cert-points", "once", "--student", "STU42"]);
        match cli.command {
            Commands::Once { student } => assert_eq!(student.as_deref(), Some("STU42")),
            _ => panic!("once サブコマンドになっていない"),
        }
    }
}

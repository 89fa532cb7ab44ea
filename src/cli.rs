use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "car-inspector")]
#[command(about = "Car photo damage inspection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 検出サービスのベースURL（設定ファイル・環境変数より優先）
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真1枚を解析して損傷レポートを表示
    Analyze {
        /// 解析する写真 (.jpg, .jpeg, .png)
        #[arg(required = true)]
        file: PathBuf,

        /// レポートをJSONで出力
        #[arg(long)]
        json: bool,

        /// サービスの可視化画像を保存するパス
        #[arg(long)]
        save_visualization: Option<PathBuf>,
    },

    /// 検出サービスの死活確認
    Health {
        /// 設定間隔でポーリングを続ける
        #[arg(short, long)]
        watch: bool,
    },

    /// 検出モデルの情報を表示
    ModelInfo,

    /// 設定の表示・変更
    Config {
        /// 検出サービスのベースURLを保存
        #[arg(long)]
        set_api_url: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}

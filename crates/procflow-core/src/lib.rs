//! procflow-core
//!
//! アプリケーションの1プロセス（web, worker など）について、
//! コンテナオーケストレーション向けのプロセス記述子を組み立てます。
//!
//! - [`builder`]: オーバーレイを順に適用するパイプライン
//! - [`scope`]: ラベル・アノテーションの適用範囲の解決
//! - [`ports`]: ポート供給元とポート環境変数の導出
//! - [`parser`] / [`loader`]: KDL設定ファイルからの読み込み

pub mod app;
pub mod builder;
pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod ports;
pub mod scope;

pub use app::*;
pub use builder::*;
pub use error::*;
pub use loader::*;
pub use model::*;
pub use parser::{parse_kdl_file, parse_kdl_string};
pub use ports::*;
pub use scope::*;

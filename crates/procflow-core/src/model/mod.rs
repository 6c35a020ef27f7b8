//! モデル定義
//!
//! procflowで使用されるデータモデルを定義します。
//! 各モデルは機能ごとにモジュールに分離されています。

mod metadata;
mod port;
mod probe;
mod process;
mod runtime;
mod volume;

// Re-exports
pub use metadata::*;
pub use port::*;
pub use probe::*;
pub use process::*;
pub use runtime::*;
pub use volume::*;

// crates/sv_config/src/lib.rs

//! SunView Config Layer
//!
//! 配置层，读取上游求解器的键值设置文件（`suntans.dat` 风格），
//! 并整理为加载分区数据所需的 [`DataConfig`]。
//!
//! # 模块概览
//!
//! - [`settings`]: 通用键值设置文件解析
//! - [`data_config`]: 层数、输出步数和各类文件名
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! sv_cli      ─> DataConfig::load
//! sv_query    ─> 会话与查询
//! sv_state    ─> 使用 DataConfig 定位时间步文件
//! sv_mesh     ─> 使用 DataConfig 定位拓扑文件
//! sv_config   ─> Settings, DataConfig (本层)
//! sv_foundation
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod data_config;
pub mod error;
pub mod settings;

pub use data_config::{DataConfig, FileStems};
pub use error::ConfigError;
pub use settings::Settings;

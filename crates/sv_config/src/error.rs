// crates/sv_config/src/error.rs

//! 配置层错误类型

use std::path::PathBuf;

use sv_foundation::SvError;

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("无法读取设置文件 {path}: {source}")]
    Io {
        /// 设置文件路径
        path: PathBuf,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 解析错误
    #[error("解析错误: {file} 第{line}行: {message}")]
    Parse {
        /// 来源名称
        file: String,
        /// 行号
        line: usize,
        /// 错误信息
        message: String,
    },

    /// 无效值
    #[error("无效值 '{key}': {value} - {reason}")]
    InvalidValue {
        /// 配置键
        key: String,
        /// 配置值
        value: String,
        /// 原因
        reason: String,
    },

    /// 缺失配置
    #[error("缺失配置: {0}")]
    Missing(String),
}

impl From<ConfigError> for SvError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io { path, source } => {
                if source.kind() == std::io::ErrorKind::NotFound {
                    SvError::file_not_found(path)
                } else {
                    SvError::io_with_source(format!("读取设置文件 {}", path.display()), source)
                }
            }
            ConfigError::Parse { file, line, message } => SvError::parse(file, line, message),
            ConfigError::InvalidValue { key, value, reason } => {
                SvError::invalid_config(key, value, reason)
            }
            ConfigError::Missing(key) => SvError::missing_config(key),
        }
    }
}

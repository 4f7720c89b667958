// crates/sv_config/src/settings.rs

//! 键值设置文件解析
//!
//! 上游求解器的设置文件格式非常简单：
//!
//! ```text
//! # 注释行
//! Nkmax      10        # 垂向层数
//! nsteps     1000
//! points     points.dat
//! ```
//!
//! 每行第一个记号是键，第二个是值，`#` 之后为注释，空行忽略。
//! 后出现的同名键覆盖先出现的。

use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;

/// 单个设置项
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    line: usize,
}

/// 解析后的键值设置
#[derive(Debug, Clone, Default)]
pub struct Settings {
    source: String,
    entries: HashMap<String, Entry>,
}

impl Settings {
    /// 从文件读取
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path.display().to_string())
    }

    /// 从文本解析
    ///
    /// `source` 仅用于错误信息。
    pub fn parse(text: &str, source: impl Into<String>) -> Result<Self, ConfigError> {
        let source = source.into();
        let mut entries = HashMap::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let content = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let mut tokens = content.split_whitespace();
            let Some(key) = tokens.next() else {
                continue;
            };
            let value = tokens.next().ok_or_else(|| ConfigError::Parse {
                file: source.clone(),
                line: line_no,
                message: format!("键 '{}' 缺少值", key),
            })?;
            entries.insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    line: line_no,
                },
            );
        }

        Ok(Self { source, entries })
    }

    /// 来源名称
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 设置项数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 是否包含键
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 可选字符串值
    pub fn get_opt_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    /// 必需字符串值
    pub fn get_str(&self, key: &str) -> Result<&str, ConfigError> {
        self.get_opt_str(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    /// 必需浮点值
    pub fn get_f64(&self, key: &str) -> Result<f64, ConfigError> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))?;
        entry
            .value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ConfigError::Parse {
                file: self.source.clone(),
                line: entry.line,
                message: format!("键 '{}' 的值 '{}' 不是有效数字", key, entry.value),
            })
    }

    /// 必需非负整数值
    ///
    /// 允许浮点写法（如 `1e3`），但必须是整数。
    pub fn get_usize(&self, key: &str) -> Result<usize, ConfigError> {
        let v = self.get_f64(key)?;
        if v < 0.0 || v.fract() != 0.0 || v > usize::MAX as f64 {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: v.to_string(),
                reason: "必须为非负整数".to_string(),
            });
        }
        Ok(v as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# suntans 设置
Nkmax   10   # 垂向层数
nsteps  1e3
ntout   10

points  points.dat
bad     1.5
";

    #[test]
    fn test_parse_and_lookup() {
        let s = Settings::parse(SAMPLE, "suntans.dat").unwrap();
        assert_eq!(s.len(), 5);
        assert_eq!(s.get_usize("Nkmax").unwrap(), 10);
        assert_eq!(s.get_usize("nsteps").unwrap(), 1000);
        assert_eq!(s.get_str("points").unwrap(), "points.dat");
        assert!(s.get_opt_str("edges").is_none());
    }

    #[test]
    fn test_missing_key() {
        let s = Settings::parse(SAMPLE, "suntans.dat").unwrap();
        assert!(matches!(s.get_str("cells"), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_non_integral_rejected() {
        let s = Settings::parse(SAMPLE, "suntans.dat").unwrap();
        assert!(matches!(
            s.get_usize("bad"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_malformed_number_reports_line() {
        let s = Settings::parse("Nkmax ten\n", "x").unwrap();
        match s.get_usize("Nkmax") {
            Err(ConfigError::Parse { line, .. }) => assert_eq!(line, 1),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_key_without_value() {
        assert!(matches!(
            Settings::parse("a 1\nNkmax\n", "x"),
            Err(ConfigError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_later_key_overrides() {
        let s = Settings::parse("ntout 5\nntout 7\n", "x").unwrap();
        assert_eq!(s.get_usize("ntout").unwrap(), 7);
    }
}

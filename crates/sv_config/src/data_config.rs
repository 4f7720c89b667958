// crates/sv_config/src/data_config.rs

//! 数据目录配置
//!
//! 从设置文件中提取分区数据加载所需的全部参数：
//! 垂向层数、总步数与输出间隔，以及拓扑文件和时间步文件的名称。
//! 所有文件名都相对于设置文件所在目录解析。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::settings::Settings;

/// 设置文件默认名称
pub const DEFAULT_SETTINGS_FILE: &str = "suntans.dat";

/// 各类数据文件的名称（分区文件会追加 `.<分区号>` 后缀）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStems {
    /// 全局顶点文件（不分区）
    pub points: String,
    /// 边文件
    pub edges: String,
    /// 单元文件
    pub cells: String,
    /// 单元中心数据文件
    pub celldata: String,
    /// 盐度
    pub salinity: String,
    /// 背景盐度（只读一次）
    pub background_salinity: String,
    /// 水平速度
    pub horizontal_velocity: String,
    /// 垂向速度
    pub vertical_velocity: String,
    /// 自由面
    pub free_surface: String,
}

impl FileStems {
    fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let opt = |key: &str, default: &str| {
            settings.get_opt_str(key).unwrap_or(default).to_string()
        };
        Ok(Self {
            points: settings.get_str("points")?.to_string(),
            edges: settings.get_str("edges")?.to_string(),
            cells: settings.get_str("cells")?.to_string(),
            celldata: settings.get_str("celldata")?.to_string(),
            salinity: opt("SalinityFile", "s.dat"),
            background_salinity: opt("BGSalinityFile", "s0.dat"),
            horizontal_velocity: opt("HorizontalVelocityFile", "u.dat"),
            vertical_velocity: opt("VerticalVelocityFile", "w.dat"),
            free_surface: opt("FreeSurfaceFile", "fs.dat"),
        })
    }
}

/// 数据加载配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// 数据目录（设置文件所在目录）
    pub data_dir: PathBuf,
    /// 垂向层数 `Nkmax`
    pub n_layers: usize,
    /// 总计算步数 `nsteps`
    pub nsteps: usize,
    /// 输出间隔 `ntout`
    pub ntout: usize,
    /// 文件名
    pub files: FileStems,
}

impl DataConfig {
    /// 读取设置文件
    ///
    /// `path` 可以是设置文件本身，也可以是包含 `suntans.dat` 的目录。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = if path.is_dir() {
            path.join(DEFAULT_SETTINGS_FILE)
        } else {
            path.to_path_buf()
        };
        let settings = Settings::load(&file)?;
        let data_dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_settings(&settings, data_dir)
    }

    /// 从已解析的设置构建
    pub fn from_settings(
        settings: &Settings,
        data_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let n_layers = settings.get_usize("Nkmax")?;
        if n_layers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "Nkmax".into(),
                value: "0".into(),
                reason: "至少需要一层".into(),
            });
        }
        let nsteps = settings.get_usize("nsteps")?;
        let ntout = settings.get_usize("ntout")?;
        if ntout == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ntout".into(),
                value: "0".into(),
                reason: "输出间隔必须为正".into(),
            });
        }

        let config = Self {
            data_dir: data_dir.into(),
            n_layers,
            nsteps,
            ntout,
            files: FileStems::from_settings(settings)?,
        };
        debug!(
            "数据配置: Nkmax={}, nsteps={}, ntout={}, 可用输出步={}",
            config.n_layers,
            config.nsteps,
            config.ntout,
            config.n_snapshots()
        );
        Ok(config)
    }

    /// 可加载的输出步数（`nsteps / ntout`），有效步号为 `1..=n_snapshots`
    pub fn n_snapshots(&self) -> usize {
        self.nsteps / self.ntout
    }

    /// 全局顶点文件路径
    pub fn points_path(&self) -> PathBuf {
        self.data_dir.join(&self.files.points)
    }

    /// 分区文件路径 `<data_dir>/<stem>.<partition>`
    pub fn partition_path(&self, stem: &str, partition: usize) -> PathBuf {
        self.data_dir.join(format!("{}.{}", stem, partition))
    }

    /// 单元文件路径
    pub fn cells_path(&self, partition: usize) -> PathBuf {
        self.partition_path(&self.files.cells, partition)
    }

    /// 边文件路径
    pub fn edges_path(&self, partition: usize) -> PathBuf {
        self.partition_path(&self.files.edges, partition)
    }

    /// 单元中心数据文件路径
    pub fn celldata_path(&self, partition: usize) -> PathBuf {
        self.partition_path(&self.files.celldata, partition)
    }
}

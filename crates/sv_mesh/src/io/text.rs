// crates/sv_mesh/src/io/text.rs

//! 定长文本记录读取与拓扑加载
//!
//! # 示例
//!
//! ```ignore
//! use sv_config::DataConfig;
//! use sv_mesh::io::TopologyLoader;
//!
//! let config = DataConfig::load("data/")?;
//! let topo = TopologyLoader::load(&config, 4)?;
//! println!("共 {} 个单元", topo.total_cells());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sv_config::DataConfig;
use sv_foundation::{Point2D, SvError, SvResult};
use tracing::{debug, info};

use crate::partition::{Partition, NFACES};
use crate::topology::{GlobalPointSet, MeshTopology};

/// 单行记录
#[derive(Debug, Clone)]
pub struct Record<'a> {
    line: usize,
    tokens: Vec<&'a str>,
}

impl Record<'_> {
    /// 文件中的行号（从 1 开始）
    pub fn line(&self) -> usize {
        self.line
    }

    /// 记号数
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// 是否为空记录
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// 非空行记录读取器
///
/// 记录数等于文件的非空行数，与上游"按行计数"的约定一致。
#[derive(Debug)]
pub struct RecordReader {
    path: PathBuf,
    text: String,
}

impl RecordReader {
    /// 打开文件并读入全部内容
    pub fn open(path: impl AsRef<Path>) -> SvResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SvError::file_not_found(path),
            _ => SvError::io_with_source(format!("无法读取 {}", path.display()), e),
        })?;
        Ok(Self::from_text(path, text))
    }

    /// 直接由文本构造（测试或内存数据）
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// 文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 遍历非空行记录
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.text.lines().enumerate().filter_map(|(idx, raw)| {
            let tokens: Vec<&str> = raw.split_whitespace().collect();
            (!tokens.is_empty()).then_some(Record {
                line: idx + 1,
                tokens,
            })
        })
    }

    /// 记录数
    pub fn count(&self) -> usize {
        self.records().count()
    }

    /// 取记录中的浮点字段
    pub fn float(&self, rec: &Record<'_>, field: usize) -> SvResult<f64> {
        let tok = self.token(rec, field)?;
        tok.parse::<f64>().map_err(|_| {
            SvError::parse(
                &self.path,
                rec.line,
                format!("第 {} 列 '{}' 不是数字", field + 1, tok),
            )
        })
    }

    /// 取记录中的非负整数字段
    pub fn index(&self, rec: &Record<'_>, field: usize) -> SvResult<usize> {
        let tok = self.token(rec, field)?;
        tok.parse::<usize>().map_err(|_| {
            SvError::parse(
                &self.path,
                rec.line,
                format!("第 {} 列 '{}' 不是非负整数", field + 1, tok),
            )
        })
    }

    fn token<'r>(&self, rec: &'r Record<'_>, field: usize) -> SvResult<&'r str> {
        rec.tokens.get(field).copied().ok_or_else(|| {
            SvError::parse(
                &self.path,
                rec.line,
                format!("需要至少 {} 列，实际 {} 列", field + 1, rec.len()),
            )
        })
    }
}

/// 分区拓扑加载器
pub struct TopologyLoader;

impl TopologyLoader {
    /// 读取全局顶点和 `n_partitions` 个分区
    ///
    /// 任何文件缺失或格式错误都直接返回错误，不做部分加载。
    pub fn load(config: &DataConfig, n_partitions: usize) -> SvResult<MeshTopology> {
        if n_partitions == 0 {
            return Err(SvError::invalid_input("分区数必须为正"));
        }

        let points = Self::load_points(&config.points_path())?;
        info!("读取全局顶点 {} 个", points.len());

        let mut partitions = Vec::with_capacity(n_partitions);
        for p in 0..n_partitions {
            let part = Self::load_partition(config, p)?;
            debug!(
                "分区 {}: Nc={}, Ne={}",
                p,
                part.n_cells(),
                part.n_edges()
            );
            partitions.push(part);
        }

        let topo = MeshTopology::new(points, partitions)?;
        info!(
            "拓扑加载完成: {} 个分区, {} 个单元, dmax={:.3}",
            topo.n_partitions(),
            topo.total_cells(),
            topo.max_depth()
        );
        Ok(topo)
    }

    /// 读取全局顶点文件
    pub fn load_points(path: &Path) -> SvResult<GlobalPointSet> {
        let reader = RecordReader::open(path)?;
        Self::parse_points(&reader)
    }

    /// 解析顶点记录 `x y 标记`
    pub fn parse_points(reader: &RecordReader) -> SvResult<GlobalPointSet> {
        let points = reader
            .records()
            .map(|rec| Ok(Point2D::new(reader.float(&rec, 0)?, reader.float(&rec, 1)?)))
            .collect::<SvResult<Vec<_>>>()?;
        Ok(GlobalPointSet::new(points))
    }

    /// 读取单个分区的单元、边与单元中心数据
    pub fn load_partition(config: &DataConfig, partition: usize) -> SvResult<Partition> {
        let cells = Self::parse_cells(&RecordReader::open(config.cells_path(partition))?)?;
        let edges = Self::parse_edges(&RecordReader::open(config.edges_path(partition))?)?;

        let celldata = RecordReader::open(config.celldata_path(partition))?;
        let n_records = celldata.count();
        SvError::check_size("celldata", cells.len(), n_records)?;
        let (centroids, depth, faces) = Self::parse_celldata(&celldata)?;

        Partition::new(partition, cells, centroids, depth, faces, edges)
    }

    /// 单元记录：顶点编号位于第 3..5 列
    pub fn parse_cells(reader: &RecordReader) -> SvResult<Vec<[usize; NFACES]>> {
        reader
            .records()
            .map(|rec| {
                Ok([
                    reader.index(&rec, 2)?,
                    reader.index(&rec, 3)?,
                    reader.index(&rec, 4)?,
                ])
            })
            .collect()
    }

    /// 边记录：端点编号位于第 1..2 列
    pub fn parse_edges(reader: &RecordReader) -> SvResult<Vec<[usize; 2]>> {
        reader
            .records()
            .map(|rec| Ok([reader.index(&rec, 0)?, reader.index(&rec, 1)?]))
            .collect()
    }

    /// 单元中心数据：中心坐标、水深、面 -> 边映射
    #[allow(clippy::type_complexity)]
    pub fn parse_celldata(
        reader: &RecordReader,
    ) -> SvResult<(Vec<Point2D>, Vec<f64>, Vec<[usize; NFACES]>)> {
        let mut centroids = Vec::new();
        let mut depth = Vec::new();
        let mut faces = Vec::new();
        for rec in reader.records() {
            centroids.push(Point2D::new(reader.float(&rec, 0)?, reader.float(&rec, 1)?));
            depth.push(reader.float(&rec, 3)?);
            faces.push([
                reader.index(&rec, 5)?,
                reader.index(&rec, 6)?,
                reader.index(&rec, 7)?,
            ]);
        }
        Ok((centroids, depth, faces))
    }
}

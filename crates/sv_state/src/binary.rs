// crates/sv_state/src/binary.rs

//! 定长 `f64` 记录文件
//!
//! 求解器的时间步输出是无文件头的 `f64` 平铺数组（小端），
//! 定位完全依靠调用方计算的偏移量（以值个数计）。

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use sv_foundation::{SvError, SvResult};

const VALUE_SIZE: u64 = std::mem::size_of::<f64>() as u64;

/// 二进制记录文件读取器
#[derive(Debug)]
pub struct RecordFile {
    path: PathBuf,
    reader: BufReader<File>,
}

impl RecordFile {
    /// 打开文件，不存在时返回 `FileNotFound`
    pub fn open(path: impl AsRef<Path>) -> SvResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SvError::file_not_found(path),
            _ => SvError::io_with_source(format!("无法打开 {}", path.display()), e),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
        })
    }

    /// 文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 定位到第 `n_values` 个值
    pub fn seek_values(&mut self, n_values: u64) -> SvResult<()> {
        let offset = n_values * VALUE_SIZE;
        self.reader.seek(SeekFrom::Start(offset)).map_err(|e| {
            SvError::io_with_source(
                format!("{} 定位到字节 {} 失败", self.path.display(), offset),
                e,
            )
        })?;
        Ok(())
    }

    /// 读取 `buf.len()` 个值
    pub fn read_into(&mut self, buf: &mut [f64]) -> SvResult<()> {
        let mut bytes = [0u8; VALUE_SIZE as usize];
        for v in buf.iter_mut() {
            self.reader.read_exact(&mut bytes).map_err(|e| {
                SvError::io_with_source(
                    format!("{} 数据不足（记录截断）", self.path.display()),
                    e,
                )
            })?;
            *v = f64::from_le_bytes(bytes);
        }
        Ok(())
    }

    /// 读取一条长度为 `len` 的记录
    pub fn read_record(&mut self, len: usize) -> SvResult<Vec<f64>> {
        let mut buf = vec![0.0; len];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// 跳过 `len` 个值
    pub fn skip_record(&mut self, len: usize) -> SvResult<()> {
        let delta = (len as u64 * VALUE_SIZE) as i64;
        self.reader.seek_relative(delta).map_err(|e| {
            SvError::io_with_source(format!("{} 跳过记录失败", self.path.display()), e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_values(path: &Path, values: &[f64]) {
        let mut f = File::create(path).unwrap();
        for v in values {
            f.write_all(&v.to_le_bytes()).unwrap();
        }
    }

    #[test]
    fn test_seek_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.dat.0");
        write_values(&path, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

        let mut f = RecordFile::open(&path).unwrap();
        f.seek_values(2).unwrap();
        assert_eq!(f.read_record(2).unwrap(), vec![2.0, 3.0]);
        f.skip_record(1).unwrap();
        assert_eq!(f.read_record(1).unwrap(), vec![5.0]);
    }

    #[test]
    fn test_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fs.dat.0");
        write_values(&path, &[1.0, 2.0]);
        let mut f = RecordFile::open(&path).unwrap();
        f.seek_values(1).unwrap();
        assert!(matches!(f.read_record(2), Err(SvError::Io { .. })));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RecordFile::open(dir.path().join("u.dat.3")),
            Err(SvError::FileNotFound { .. })
        ));
    }
}

//! Cave Sketch 文件格式处理
//!
//! 支持：
//! - `.dxf` 测绘图纸导入
//! - 节点表 `.csv` 读写
//! - 页面 `.svg` 与地图 `.html` 导出

pub mod dxf_io;
pub mod error;
pub mod export;
pub mod table_io;

pub use dxf_io::LayerConventions;
pub use error::{FileError, FileResult};
pub use export::{MapExporter, SvgExporter};

use cave_core::graph::{build, BuildOptions};
use cave_core::node::NodeTable;
use std::path::Path;

/// 读取 DXF 并构建节点表
pub fn parse_dxf(
    path: &Path,
    conventions: &LayerConventions,
    options: &BuildOptions,
) -> FileResult<NodeTable> {
    let entities = dxf_io::import(path, conventions)?;
    Ok(build(&entities, options)?)
}

//! 节点表 CSV 读写
//!
//! 列为 `Node_Id, Links, X, Y, Type`。`Node_Id`、`Links`、`Type` 始终按字符串读回，
//! 坐标按 f64 读回，保证写出再读入得到相同的节点表。

use crate::error::{FileError, FileResult};
use cave_core::math::Point2;
use cave_core::node::{parse_links_field, Node, NodeId, NodeTable, NodeType};
use polars::frame::DataFrame;
use polars::io::{SerReader, SerWriter};
use polars::prelude::{
    CsvReadOptions, CsvReader, CsvWriter, DataType, Field, NamedFrom, Schema, SchemaRef,
};
use polars::series::Series;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub const COL_ID: &str = "Node_Id";
pub const COL_LINKS: &str = "Links";
pub const COL_X: &str = "X";
pub const COL_Y: &str = "Y";
pub const COL_TYPE: &str = "Type";

/// 节点表 → DataFrame
pub fn to_frame(table: &NodeTable) -> FileResult<DataFrame> {
    let mut ids = Vec::with_capacity(table.len());
    let mut links = Vec::with_capacity(table.len());
    let mut xs = Vec::with_capacity(table.len());
    let mut ys = Vec::with_capacity(table.len());
    let mut types = Vec::with_capacity(table.len());
    for node in table {
        ids.push(node.id.to_string());
        links.push(node.links_field());
        xs.push(node.position.x);
        ys.push(node.position.y);
        types.push(node.node_type.tag().to_string());
    }

    let df = DataFrame::new(vec![
        Series::new(COL_ID.into(), ids).into(),
        Series::new(COL_LINKS.into(), links).into(),
        Series::new(COL_X.into(), xs).into(),
        Series::new(COL_Y.into(), ys).into(),
        Series::new(COL_TYPE.into(), types).into(),
    ])?;
    Ok(df)
}

/// DataFrame → 节点表
pub fn from_frame(df: &DataFrame) -> FileResult<NodeTable> {
    for column in [COL_ID, COL_LINKS, COL_X, COL_Y] {
        if df.column(column).is_err() {
            return Err(FileError::InvalidFormat(format!("node table lacks column '{column}'")));
        }
    }

    let ids = df.column(COL_ID)?.str()?;
    let links = df.column(COL_LINKS)?.str()?;
    let xs = df.column(COL_X)?.cast(&DataType::Float64)?;
    let ys = df.column(COL_Y)?.cast(&DataType::Float64)?;
    let (xs, ys) = (xs.f64()?, ys.f64()?);
    // 缺少类型列的旧表按测站/洞壁推断
    let types = match df.column(COL_TYPE) {
        Ok(column) => Some(column.str()?.clone()),
        Err(_) => None,
    };

    let mut table = NodeTable::new();
    for row in 0..df.height() {
        let id = ids
            .get(row)
            .ok_or_else(|| FileError::InvalidFormat(format!("row {row}: missing {COL_ID}")))?;
        let (Some(x), Some(y)) = (xs.get(row), ys.get(row)) else {
            return Err(FileError::InvalidFormat(format!("row {row}: missing coordinate")));
        };
        let node_type = match types.as_ref().and_then(|t| t.get(row)) {
            Some(tag) => NodeType::from_tag(tag),
            None if NodeId::new(id).is_numeric() => NodeType::Station,
            None => NodeType::Wall,
        };
        let node = Node::new(id, Point2::new(x, y), node_type)
            .with_links(parse_links_field(links.get(row).unwrap_or_default()));
        table.insert(node)?;
    }
    Ok(table)
}

/// 写出到 CSV 文件
pub fn write_table(table: &NodeTable, path: &Path) -> FileResult<()> {
    let mut df = to_frame(table)?;
    let file = File::create(path)?;
    CsvWriter::new(file).finish(&mut df)?;
    info!(path = %path.display(), nodes = table.len(), "node table written");
    Ok(())
}

/// 写出为 CSV 字符串
pub fn write_table_string(table: &NodeTable) -> FileResult<String> {
    let mut df = to_frame(table)?;
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer).finish(&mut df)?;
    String::from_utf8(buffer).map_err(|e| FileError::InvalidFormat(e.to_string()))
}

/// 从 CSV 文件读取
pub fn read_table(path: &Path) -> FileResult<NodeTable> {
    let file = File::open(path)?;
    let df = CsvReader::new(file).with_options(read_options()).finish()?;
    from_frame(&df)
}

/// 从 CSV 字节读取
pub fn read_table_bytes(bytes: &[u8]) -> FileResult<NodeTable> {
    let df = CsvReader::new(Cursor::new(bytes))
        .with_options(read_options())
        .finish()?;
    from_frame(&df)
}

fn read_options() -> CsvReadOptions {
    CsvReadOptions::default().with_schema_overwrite(Some(table_schema()))
}

/// 防止数字ID被推断为整数，`-` 占位被推断为空值
fn table_schema() -> SchemaRef {
    Arc::new(Schema::from_iter([
        Field::new(COL_ID.into(), DataType::String),
        Field::new(COL_LINKS.into(), DataType::String),
        Field::new(COL_X.into(), DataType::Float64),
        Field::new(COL_Y.into(), DataType::Float64),
        Field::new(COL_TYPE.into(), DataType::String),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NodeTable {
        NodeTable::from_nodes([
            Node::new("0", Point2::new(0.0, 0.0), NodeType::Station).with_links(["1".into()]),
            Node::new("1", Point2::new(10.0, -0.1), NodeType::Station).with_links(["0".into()]),
            Node::new("7", Point2::new(1.0 / 3.0, 2.5e-7), NodeType::Station),
            Node::new("0P0", Point2::new(2.0, 4.0), NodeType::WallPresumed)
                .with_links(["0P1".into()]),
            Node::new("0P1", Point2::new(6.125, 8.0), NodeType::Other("L_flowstone".into()))
                .with_links(["0P0".into()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_round_trip_through_string() {
        let table = sample();
        let csv = write_table_string(&table).unwrap();
        assert!(csv.starts_with("Node_Id,Links,X,Y,Type"));

        let back = read_table_bytes(csv.as_bytes()).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.get("7").unwrap().links(), &[] as &[NodeId]);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nodes.csv");
        let table = sample();

        write_table(&table, &path).unwrap();
        let back = read_table(&path).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_missing_type_column_is_inferred() {
        let csv = "Node_Id,Links,X,Y\n0,1,0.0,0.0\n1,0,3.0,4.0\n0P0,0P1,1.0,1.0\n0P1,0P0,2.0,2.0\n";
        let table = read_table_bytes(csv.as_bytes()).unwrap();
        assert_eq!(table.get("1").unwrap().node_type, NodeType::Station);
        assert_eq!(table.get("0P0").unwrap().node_type, NodeType::Wall);
        assert!(table.get("0").unwrap().has_link("1"));
    }

    #[test]
    fn test_missing_column_is_invalid() {
        let mut df = to_frame(&sample()).unwrap();
        let _ = df.drop_in_place(COL_LINKS).unwrap();
        let err = from_frame(&df).unwrap_err();
        assert!(matches!(err, FileError::InvalidFormat(_)));
    }
}

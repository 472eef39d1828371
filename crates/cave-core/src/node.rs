//! 节点与节点表
//!
//! 测站和多段线顶点统一表示为节点，邻接关系保存在每个节点的 `links` 中。

use crate::error::{CoreError, CoreResult};
use crate::math::{BoundingBox2, Point2};
use crate::transform::Transform2D;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// 平面表中 `Links` 列的分隔符
pub const LINK_SEPARATOR: char = '-';

/// 无邻接节点时 `Links` 列的占位值
pub const EMPTY_LINKS: &str = "-";

/// 节点唯一标识符
///
/// 测站使用数字字面量，多段线顶点使用 `{line}P{vertex}`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 多段线顶点ID
    pub fn vertex(line_index: usize, vertex_index: usize) -> Self {
        Self(format!("{line_index}P{vertex_index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 是否为测站式的数字ID
    pub fn is_numeric(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(|c| c.is_ascii_digit())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// 节点的语义类型
///
/// 决定绘图样式，以及在地图中按线还是按面处理。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Station,
    Wall,
    Slope,
    Chimney,
    Border,
    Pit,
    WallPresumed,
    Water,
    /// 未知标签，原样保留
    Other(String),
}

impl NodeType {
    /// 平面表中使用的标签
    pub fn tag(&self) -> &str {
        match self {
            NodeType::Station => "station",
            NodeType::Wall => "wall",
            NodeType::Slope => "slope",
            NodeType::Chimney => "chimney",
            NodeType::Border => "border",
            NodeType::Pit => "pit",
            NodeType::WallPresumed => "wall-presumed",
            NodeType::Water => "water",
            NodeType::Other(tag) => tag,
        }
    }

    /// 识别已知标签，不识别时返回 `None`
    ///
    /// 接受 `L_`/`A_` 前缀（线型/面型命名约定），不区分大小写，`_` 与 `-` 等价。
    pub fn from_known_tag(tag: &str) -> Option<Self> {
        let lower = tag.trim().to_ascii_lowercase().replace('_', "-");
        let bare = lower
            .strip_prefix("l-")
            .or_else(|| lower.strip_prefix("a-"))
            .unwrap_or(&lower);
        let node_type = match bare {
            "station" => NodeType::Station,
            "wall" => NodeType::Wall,
            "slope" => NodeType::Slope,
            "chimney" => NodeType::Chimney,
            "border" => NodeType::Border,
            "pit" => NodeType::Pit,
            "wall-presumed" => NodeType::WallPresumed,
            "water" => NodeType::Water,
            _ => return None,
        };
        Some(node_type)
    }

    /// 解析标签，未知标签保存为 `Other`
    pub fn from_tag(tag: &str) -> Self {
        Self::from_known_tag(tag).unwrap_or_else(|| NodeType::Other(tag.trim().to_string()))
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// 测绘节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Point2,
    pub node_type: NodeType,
    links: Vec<NodeId>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, position: Point2, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            position,
            node_type,
            links: Vec::new(),
        }
    }

    /// 使用指定的邻接列表（去重、去自环）
    pub fn with_links(mut self, links: impl IntoIterator<Item = NodeId>) -> Self {
        for link in links {
            self.add_link(link);
        }
        self
    }

    /// 添加邻接节点；重复或指向自身时忽略，返回是否实际添加
    pub fn add_link(&mut self, link: NodeId) -> bool {
        if link == self.id || self.links.contains(&link) {
            return false;
        }
        self.links.push(link);
        true
    }

    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    pub fn has_link(&self, id: &str) -> bool {
        self.links.iter().any(|l| l.as_str() == id)
    }

    pub fn is_station(&self) -> bool {
        self.node_type == NodeType::Station
    }

    /// `Links` 列的文本形式
    pub fn links_field(&self) -> String {
        if self.links.is_empty() {
            return EMPTY_LINKS.to_string();
        }
        self.links
            .iter()
            .map(NodeId::as_str)
            .collect::<Vec<_>>()
            .join(&LINK_SEPARATOR.to_string())
    }
}

/// 解析 `Links` 列，空白和 `-` 占位都表示没有邻接节点
pub fn parse_links_field(field: &str) -> Vec<NodeId> {
    field
        .split(LINK_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(NodeId::from)
        .collect()
}

/// 节点表
///
/// 保持插入顺序，按ID索引。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeTable {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由节点集合构建，ID重复时报错
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> CoreResult<Self> {
        let mut table = Self::new();
        for node in nodes {
            table.insert(node)?;
        }
        Ok(table)
    }

    /// 插入节点
    pub fn insert(&mut self, node: Node) -> CoreResult<()> {
        if self.index.contains_key(&node.id) {
            return Err(CoreError::DuplicateNode(node.id.to_string()));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.index.get(id).map(|&i| &mut self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn position(&self, id: &str) -> Option<Point2> {
        self.get(id).map(|n| n.position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn stations(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_station())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 节点邻接中能在表内解析到的节点
    pub fn resolved_links<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.links().iter().filter_map(move |id| {
            let resolved = self.get(id.as_str());
            if resolved.is_none() {
                tracing::trace!(node = %node.id, link = %id, "unresolved link skipped");
            }
            resolved
        })
    }

    /// 所有节点坐标的包围盒
    pub fn bounds(&self) -> BoundingBox2 {
        BoundingBox2::from_points(self.nodes.iter().map(|n| n.position))
    }

    /// 坐标质心（算术平均）
    pub fn centroid(&self) -> Point2 {
        if self.nodes.is_empty() {
            return Point2::origin();
        }
        let n = self.nodes.len() as f64;
        let (sx, sy) = self
            .nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.position.x, sy + node.position.y));
        Point2::new(sx / n, sy / n)
    }

    /// 对所有坐标应用变换，返回新表
    pub fn transformed(&self, transform: &Transform2D) -> Self {
        let mut table = self.clone();
        for node in &mut table.nodes {
            node.position = transform.transform_point(&node.position);
        }
        table
    }

    /// 绕质心旋转（角度制），返回新表
    pub fn rotated(&self, degrees: f64) -> Self {
        self.rotated_around(self.centroid(), degrees)
    }

    /// 绕指定中心旋转（角度制），返回新表
    pub fn rotated_around(&self, center: Point2, degrees: f64) -> Self {
        self.transformed(&Transform2D::rotation_around_degrees(center, degrees))
    }
}

impl<'a> IntoIterator for &'a NodeTable {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

//! 节点图构建
//!
//! 把抽取出的测站、测线和多段线合并成一张节点表：
//! 1. 按坐标键把测线端点连接到测站，建立对称邻接
//! 2. 以参考测站为原点平移所有坐标
//! 3. 为多段线每个顶点生成 `{line}P{vertex}` 节点并按链式连接
//! 4. 合并为统一的节点表

use crate::error::{CoreError, CoreResult};
use crate::math::{Point2, PointKey, KEY_DECIMALS};
use crate::node::{Node, NodeId, NodeTable, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// 带编号的测站
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: NodeId,
    pub point: Point2,
}

impl Station {
    pub fn new(id: impl Into<NodeId>, point: Point2) -> Self {
        Self {
            id: id.into(),
            point,
        }
    }
}

/// 两个测站之间的测线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub start: Point2,
    pub end: Point2,
}

impl Leg {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }
}

/// 带语义类型的多段线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledPolyline {
    pub points: Vec<Point2>,
    pub node_type: NodeType,
    pub layer: String,
}

impl StyledPolyline {
    pub fn new(points: Vec<Point2>, node_type: NodeType, layer: impl Into<String>) -> Self {
        Self {
            points,
            node_type,
            layer: layer.into(),
        }
    }
}

/// 从图纸中抽取出的全部测绘实体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyEntities {
    /// 测站（保持图纸中的出现顺序）
    pub stations: Vec<Station>,
    pub legs: Vec<Leg>,
    pub polylines: Vec<StyledPolyline>,
}

impl SurveyEntities {
    pub fn station(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id.as_str() == id)
    }
}

/// 构建选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// 作为坐标原点的测站
    #[serde(default = "BuildOptions::default_reference")]
    pub reference_station: String,
    /// 多段线重采样步长，每隔 n 个顶点保留一个
    #[serde(default)]
    pub resample_step: Option<usize>,
    /// 坐标匹配的小数位数
    #[serde(default = "BuildOptions::default_key_decimals")]
    pub key_decimals: u32,
}

impl BuildOptions {
    fn default_reference() -> String {
        "0".to_string()
    }

    fn default_key_decimals() -> u32 {
        KEY_DECIMALS
    }

    pub fn with_reference(reference_station: impl Into<String>) -> Self {
        Self {
            reference_station: reference_station.into(),
            ..Default::default()
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            reference_station: Self::default_reference(),
            resample_step: None,
            key_decimals: Self::default_key_decimals(),
        }
    }
}

/// 构建节点表
pub fn build(entities: &SurveyEntities, options: &BuildOptions) -> CoreResult<NodeTable> {
    let offset = entities
        .station(&options.reference_station)
        .map(|s| s.point)
        .ok_or_else(|| CoreError::ReferenceNotFound(options.reference_station.clone()))?;

    let mut table = NodeTable::new();
    for station in &entities.stations {
        let local = Point2::new(station.point.x - offset.x, station.point.y - offset.y);
        table.insert(Node::new(station.id.clone(), local, NodeType::Station))?;
    }

    let linked = link_legs(entities, &mut table, options.key_decimals);

    let mut vertex_count = 0;
    for (line_index, polyline) in entities.polylines.iter().enumerate() {
        let points = resample(&polyline.points, options.resample_step);
        for node in chain_nodes(line_index, &points, &polyline.node_type, offset) {
            table.insert(node)?;
            vertex_count += 1;
        }
    }

    info!(
        stations = entities.stations.len(),
        legs = linked,
        polylines = entities.polylines.len(),
        vertices = vertex_count,
        reference = %options.reference_station,
        "node table built"
    );
    Ok(table)
}

/// 把测线端点连接到测站，返回成功连接的测线数
fn link_legs(entities: &SurveyEntities, table: &mut NodeTable, decimals: u32) -> usize {
    let mut by_key: HashMap<PointKey, Vec<&NodeId>> = HashMap::new();
    for station in &entities.stations {
        by_key
            .entry(PointKey::with_decimals(&station.point, decimals))
            .or_default()
            .push(&station.id);
    }

    let mut linked = 0;
    for leg in &entities.legs {
        let start = by_key.get(&PointKey::with_decimals(&leg.start, decimals));
        let end = by_key.get(&PointKey::with_decimals(&leg.end, decimals));
        let (Some(starts), Some(ends)) = (start, end) else {
            debug!(?leg, "leg endpoints do not match any station");
            continue;
        };

        let mut joined = false;
        for &a in starts {
            for &b in ends {
                if a == b {
                    continue;
                }
                if let Some(node) = table.get_mut(a.as_str()) {
                    node.add_link(b.clone());
                }
                if let Some(node) = table.get_mut(b.as_str()) {
                    node.add_link(a.clone());
                }
                joined = true;
            }
        }
        if joined {
            linked += 1;
        }
    }
    linked
}

fn resample(points: &[Point2], step: Option<usize>) -> Vec<Point2> {
    match step {
        Some(step) if step > 1 => points.iter().step_by(step).copied().collect(),
        _ => points.to_vec(),
    }
}

/// 生成多段线的链式节点，只与前后相邻顶点连接
fn chain_nodes(
    line_index: usize,
    points: &[Point2],
    node_type: &NodeType,
    offset: Point2,
) -> Vec<Node> {
    let last = points.len().saturating_sub(1);
    points
        .iter()
        .enumerate()
        .map(|(j, p)| {
            let mut node = Node::new(
                NodeId::vertex(line_index, j),
                Point2::new(p.x - offset.x, p.y - offset.y),
                node_type.clone(),
            );
            if j > 0 {
                node.add_link(NodeId::vertex(line_index, j - 1));
            }
            if j < last {
                node.add_link(NodeId::vertex(line_index, j + 1));
            }
            node
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stations() -> SurveyEntities {
        SurveyEntities {
            stations: vec![
                Station::new("0", Point2::new(0.0, 0.0)),
                Station::new("1", Point2::new(10.0, 0.0)),
            ],
            legs: vec![Leg::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0))],
            polylines: vec![],
        }
    }

    fn ids(node: &Node) -> Vec<&str> {
        node.links().iter().map(NodeId::as_str).collect()
    }

    #[test]
    fn test_two_station_leg() {
        let table = build(&two_stations(), &BuildOptions::default()).unwrap();

        assert_eq!(table.len(), 2);
        let s0 = table.get("0").unwrap();
        let s1 = table.get("1").unwrap();
        assert_eq!(ids(s0), vec!["1"]);
        assert_eq!(ids(s1), vec!["0"]);
        assert_eq!(s0.position, Point2::new(0.0, 0.0));
        assert_eq!(s1.position, Point2::new(10.0, 0.0));
        assert!(s0.is_station());
    }

    #[test]
    fn test_offset_places_reference_at_origin() {
        let entities = SurveyEntities {
            stations: vec![
                Station::new("0", Point2::new(512.25, -88.5)),
                Station::new("1", Point2::new(520.0, -80.0)),
            ],
            legs: vec![],
            polylines: vec![StyledPolyline::new(
                vec![Point2::new(513.25, -88.5), Point2::new(514.25, -87.5)],
                NodeType::Wall,
                "SCRAP_0",
            )],
        };
        let table = build(&entities, &BuildOptions::default()).unwrap();

        assert_eq!(table.position("0"), Some(Point2::new(0.0, 0.0)));
        assert_eq!(table.position("1"), Some(Point2::new(7.75, 8.5)));
        assert_eq!(table.position("0P0"), Some(Point2::new(1.0, 0.0)));

        let other = build(&entities, &BuildOptions::with_reference("1")).unwrap();
        assert_eq!(other.position("1"), Some(Point2::new(0.0, 0.0)));
    }

    #[test]
    fn test_missing_reference() {
        let err = build(&two_stations(), &BuildOptions::with_reference("42")).unwrap_err();
        assert_eq!(err, CoreError::ReferenceNotFound("42".into()));
    }

    #[test]
    fn test_leg_links_are_symmetric_and_unique() {
        let mut entities = two_stations();
        entities.stations.push(Station::new("2", Point2::new(10.0, 5.0)));
        entities.legs.push(Leg::new(Point2::new(10.0, 0.0), Point2::new(10.0, 5.0)));
        // 重复与反向的测线
        entities.legs.push(Leg::new(Point2::new(10.0, 0.0), Point2::new(0.0, 0.0)));
        entities.legs.push(Leg::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)));

        let table = build(&entities, &BuildOptions::default()).unwrap();
        for station in table.stations() {
            for link in station.links() {
                let other = table.get(link.as_str()).unwrap();
                assert!(other.has_link(station.id.as_str()));
            }
        }
        assert_eq!(ids(table.get("1").unwrap()), vec!["0", "2"]);
        assert_eq!(ids(table.get("0").unwrap()), vec!["1"]);
    }

    #[test]
    fn test_unmatched_and_degenerate_legs_are_ignored() {
        let mut entities = two_stations();
        entities.legs = vec![
            Leg::new(Point2::new(0.0, 0.0), Point2::new(3.0, 3.0)),
            Leg::new(Point2::new(0.0, 0.0), Point2::new(0.0, 0.0)),
        ];
        let table = build(&entities, &BuildOptions::default()).unwrap();
        assert!(table.stations().all(|s| s.links().is_empty()));
    }

    #[test]
    fn test_leg_matching_tolerates_sub_precision_noise() {
        let mut entities = two_stations();
        entities.legs = vec![Leg::new(
            Point2::new(1e-9, 0.0),
            Point2::new(10.000000000001, 0.0),
        )];
        let table = build(&entities, &BuildOptions::default()).unwrap();
        assert!(table.get("0").unwrap().has_link("1"));
    }

    #[test]
    fn test_polyline_chain() {
        let mut entities = two_stations();
        entities.polylines.push(StyledPolyline::new(
            vec![
                Point2::new(1.0, 1.0),
                Point2::new(2.0, 2.0),
                Point2::new(3.0, 1.0),
            ],
            NodeType::Wall,
            "SCRAP_0",
        ));
        let table = build(&entities, &BuildOptions::default()).unwrap();

        assert_eq!(ids(table.get("0P0").unwrap()), vec!["0P1"]);
        assert_eq!(ids(table.get("0P1").unwrap()), vec!["0P0", "0P2"]);
        assert_eq!(ids(table.get("0P2").unwrap()), vec!["0P1"]);
        assert!(table
            .iter()
            .filter(|n| !n.is_station())
            .all(|n| n.node_type == NodeType::Wall));
    }

    #[test]
    fn test_chain_integrity_across_polylines() {
        let mut entities = two_stations();
        for (i, n) in [5usize, 2, 7].iter().enumerate() {
            let points = (0..*n).map(|k| Point2::new(k as f64, i as f64)).collect();
            entities
                .polylines
                .push(StyledPolyline::new(points, NodeType::Border, "SCRAP_1"));
        }
        let table = build(&entities, &BuildOptions::default()).unwrap();

        for (i, n) in [5usize, 2, 7].iter().enumerate() {
            for j in 0..*n {
                let node = table.get(NodeId::vertex(i, j).as_str()).unwrap();
                let expected = if j == 0 || j == n - 1 { 1 } else { 2 };
                assert_eq!(node.links().len(), expected);
                if j > 0 {
                    assert!(node.has_link(NodeId::vertex(i, j - 1).as_str()));
                }
                if j < n - 1 {
                    assert!(node.has_link(NodeId::vertex(i, j + 1).as_str()));
                }
            }
        }
    }

    #[test]
    fn test_resample_keeps_every_nth_vertex() {
        let mut entities = two_stations();
        let points = (0..7).map(|k| Point2::new(k as f64, 0.0)).collect();
        entities
            .polylines
            .push(StyledPolyline::new(points, NodeType::Wall, "SCRAP_0"));
        let options = BuildOptions {
            resample_step: Some(3),
            ..Default::default()
        };
        let table = build(&entities, &options).unwrap();

        assert_eq!(table.len(), 2 + 3);
        assert_eq!(table.position("0P1"), Some(Point2::new(3.0, 0.0)));
        assert_eq!(table.position("0P2"), Some(Point2::new(6.0, 0.0)));
    }

    #[test]
    fn test_duplicate_station_ids_rejected() {
        let mut entities = two_stations();
        entities.stations.push(Station::new("1", Point2::new(4.0, 4.0)));
        let err = build(&entities, &BuildOptions::default()).unwrap_err();
        assert_eq!(err, CoreError::DuplicateNode("1".into()));
    }
}

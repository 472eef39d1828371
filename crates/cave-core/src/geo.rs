//! 局部坐标到经纬度的投影
//!
//! 每个参考点独立给出所有节点的经纬度估计，最终坐标为各估计的算术平均。
//! 米/度换算系数在参考点纬度处局部线性化，只在离参考点不远的范围内有效。

use crate::error::{CoreError, CoreResult};
use crate::node::{NodeId, NodeTable, NodeType};
use crate::style::StyleTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// 已知经纬度的参考测站
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    pub station_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ReferencePoint {
    pub fn new(station_id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            station_id: station_id.into(),
            latitude,
            longitude,
        }
    }
}

/// 某一纬度处每度对应的米数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricFactors {
    pub meters_per_degree_lat: f64,
    pub meters_per_degree_lon: f64,
}

impl MetricFactors {
    /// 截断三角级数近似
    pub fn at_latitude(latitude: f64) -> Self {
        let phi = latitude.to_radians();
        Self {
            meters_per_degree_lat: 111_132.92 - 559.82 * (2.0 * phi).cos()
                + 1.175 * (4.0 * phi).cos(),
            meters_per_degree_lon: 111_412.84 * phi.cos() - 93.5 * (3.0 * phi).cos(),
        }
    }
}

/// 单个参考点给出的估计
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoEstimate {
    pub latitude: f64,
    pub longitude: f64,
}

/// 投影后的节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoNode {
    pub id: NodeId,
    pub node_type: NodeType,
    pub links: Vec<NodeId>,
    /// 每个有效参考点的估计，顺序与参考点一致
    pub estimates: Vec<GeoEstimate>,
    pub latitude: f64,
    pub longitude: f64,
}

/// 投影结果
///
/// 与节点表同序，按ID索引。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoTable {
    nodes: Vec<GeoNode>,
    index: HashMap<NodeId, usize>,
}

impl GeoTable {
    fn from_nodes(nodes: Vec<GeoNode>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        Self { nodes, index }
    }

    pub fn get(&self, id: &str) -> Option<&GeoNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeoNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 所有节点的平均经纬度
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.nodes.is_empty() {
            return None;
        }
        let n = self.nodes.len() as f64;
        let lat = self.nodes.iter().map(|g| g.latitude).sum::<f64>() / n;
        let lon = self.nodes.iter().map(|g| g.longitude).sum::<f64>() / n;
        Some((lat, lon))
    }
}

/// 把节点表投影到经纬度
///
/// 在表中找不到测站的参考点不产生估计；一个都找不到时报错。
pub fn project(table: &NodeTable, references: &[ReferencePoint]) -> CoreResult<GeoTable> {
    let anchors: Vec<_> = references
        .iter()
        .filter_map(|r| match table.get(&r.station_id) {
            Some(node) => Some((r, node.position, MetricFactors::at_latitude(r.latitude))),
            None => {
                warn!(station = %r.station_id, "reference station not in node table, ignored");
                None
            }
        })
        .collect();

    if anchors.is_empty() {
        let ids: Vec<_> = references.iter().map(|r| r.station_id.as_str()).collect();
        return Err(CoreError::ReferenceNotFound(if ids.is_empty() {
            "no reference points supplied".to_string()
        } else {
            ids.join(", ")
        }));
    }

    let nodes = table
        .iter()
        .map(|node| {
            let estimates: Vec<GeoEstimate> = anchors
                .iter()
                .map(|(r, origin, factors)| GeoEstimate {
                    latitude: r.latitude
                        + (node.position.y - origin.y) / factors.meters_per_degree_lat,
                    longitude: r.longitude
                        + (node.position.x - origin.x) / factors.meters_per_degree_lon,
                })
                .collect();
            let n = estimates.len() as f64;
            GeoNode {
                id: node.id.clone(),
                node_type: node.node_type.clone(),
                links: node.links().to_vec(),
                latitude: estimates.iter().map(|e| e.latitude).sum::<f64>() / n,
                longitude: estimates.iter().map(|e| e.longitude).sum::<f64>() / n,
                estimates,
            }
        })
        .collect();

    info!(references = anchors.len(), "node table projected to geographic coordinates");
    Ok(GeoTable::from_nodes(nodes))
}

/// 地图上的一条折线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPolyline {
    /// `[lat, lon]` 序列
    pub points: Vec<[f64; 2]>,
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub node_type: NodeType,
}

/// 可交互地图的内存表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoMap {
    pub center: [f64; 2],
    pub zoom_start: u8,
    pub polylines: Vec<GeoPolyline>,
}

/// 默认初始缩放级别
pub const DEFAULT_MAP_ZOOM: u8 = 15;

impl GeoMap {
    /// 为每条可解析的邻接关系生成一条折线，洞壁使用较粗的线
    pub fn from_table(geo: &GeoTable, styles: &StyleTable) -> Self {
        let (lat, lon) = geo.center().unwrap_or((0.0, 0.0));
        let mut polylines = Vec::new();
        for node in geo.iter() {
            let style = styles.style_for(&node.node_type);
            let weight = if node.node_type == NodeType::Wall { 1.0 } else { 0.5 };
            for link in &node.links {
                let Some(other) = geo.get(link.as_str()) else {
                    continue;
                };
                polylines.push(GeoPolyline {
                    points: vec![
                        [other.latitude, other.longitude],
                        [node.latitude, node.longitude],
                    ],
                    color: style.color.to_hex(),
                    weight,
                    opacity: style.color.opacity(),
                    node_type: node.node_type.clone(),
                });
            }
        }
        Self {
            center: [lat, lon],
            zoom_start: DEFAULT_MAP_ZOOM,
            polylines,
        }
    }
}

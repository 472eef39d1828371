//! DXF文件导入
//!
//! 从模型空间抽取测绘实体：
//! - 测站图层：TEXT 记录后跟一条 LINE（取起点）或 POINT，组成一个测站
//! - 测线图层：LINE 记录
//! - 多段线图层：POLYLINE / LWPOLYLINE，语义类型取自线型

use crate::error::FileResult;
use cave_core::error::{CoreError, CoreResult};
use cave_core::graph::{Leg, Station, StyledPolyline, SurveyEntities};
use cave_core::math::{Point2, PointKey};
use cave_core::node::{NodeId, NodeType};
use dxf::entities::{Entity, EntityType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// 图层命名约定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConventions {
    pub station_layer: String,
    pub leg_layer: String,
    /// 多段线图层，按名称或名称前缀匹配
    pub polyline_layers: Vec<String>,
}

impl Default for LayerConventions {
    fn default() -> Self {
        Self {
            station_layer: "STATION".to_string(),
            leg_layer: "LEG".to_string(),
            polyline_layers: vec!["SCRAP".to_string()],
        }
    }
}

impl LayerConventions {
    fn is_station_layer(&self, layer: &str) -> bool {
        layer.eq_ignore_ascii_case(&self.station_layer)
    }

    fn is_leg_layer(&self, layer: &str) -> bool {
        layer.eq_ignore_ascii_case(&self.leg_layer)
    }

    /// 匹配到的多段线图层前缀
    fn polyline_prefix(&self, layer: &str) -> Option<&str> {
        let upper = layer.to_ascii_uppercase();
        self.polyline_layers
            .iter()
            .map(String::as_str)
            .find(|prefix| upper.starts_with(&prefix.to_ascii_uppercase()))
    }
}

/// 从DXF文件导入
pub fn import(path: &Path, conventions: &LayerConventions) -> FileResult<SurveyEntities> {
    let drawing = dxf::Drawing::load_file(path)
        .map_err(|e| crate::error::FileError::Dxf(format!("{}: {e}", path.display())))?;
    let entities = extract(&drawing, conventions)?;
    info!(
        path = %path.display(),
        stations = entities.stations.len(),
        legs = entities.legs.len(),
        polylines = entities.polylines.len(),
        "DXF survey imported"
    );
    Ok(entities)
}

/// 从已加载的图纸中抽取测绘实体
pub fn extract(drawing: &dxf::Drawing, conventions: &LayerConventions) -> CoreResult<SurveyEntities> {
    let layer_line_types: HashMap<String, String> = drawing
        .layers()
        .map(|layer| (layer.name.to_ascii_uppercase(), layer.line_type_name.clone()))
        .collect();

    let mut stations = StationCollector::default();
    let mut entities = SurveyEntities::default();

    for entity in drawing.entities() {
        let layer = entity.common.layer.as_str();
        if conventions.is_station_layer(layer) {
            stations.accept(entity)?;
        } else if conventions.is_leg_layer(layer) {
            if let Some(leg) = convert_leg(entity) {
                entities.legs.push(leg);
            }
        } else if let Some(prefix) = conventions.polyline_prefix(layer) {
            let layer_line_type = layer_line_types
                .get(&layer.to_ascii_uppercase())
                .map(String::as_str);
            if let Some(polyline) = convert_polyline(entity, prefix, layer_line_type) {
                entities.polylines.push(polyline);
            }
        }
    }

    entities.stations = stations.finish()?;
    Ok(entities)
}

/// 测站记录配对：文字在前，坐标在后
#[derive(Default)]
struct StationCollector {
    pending: Option<String>,
    seen: HashSet<String>,
    stations: Vec<Station>,
}

impl StationCollector {
    fn accept(&mut self, entity: &Entity) -> CoreResult<()> {
        match &entity.specific {
            EntityType::Text(text) => {
                if let Some(previous) = self.pending.take() {
                    return Err(CoreError::MalformedInput(format!(
                        "station label '{previous}' has no coordinate record"
                    )));
                }
                self.pending = Some(text.value.trim().to_string());
            }
            EntityType::Line(line) => self.place(Point2::new(line.p1.x, line.p1.y))?,
            EntityType::ModelPoint(point) => {
                self.place(Point2::new(point.location.x, point.location.y))?
            }
            _ => debug!(layer = %entity.common.layer, "unsupported station entity ignored"),
        }
        Ok(())
    }

    fn place(&mut self, point: Point2) -> CoreResult<()> {
        let Some(id) = self.pending.take() else {
            warn!(x = point.x, y = point.y, "station coordinate without label ignored");
            return Ok(());
        };
        if !self.seen.insert(id.clone()) {
            return Err(CoreError::MalformedInput(format!("duplicate station id '{id}'")));
        }
        self.stations.push(Station::new(NodeId::new(id), point));
        Ok(())
    }

    fn finish(self) -> CoreResult<Vec<Station>> {
        match self.pending {
            Some(id) => Err(CoreError::MalformedInput(format!(
                "station label '{id}' has no coordinate record"
            ))),
            None => Ok(self.stations),
        }
    }
}

fn convert_leg(entity: &Entity) -> Option<Leg> {
    let EntityType::Line(line) = &entity.specific else {
        debug!(layer = %entity.common.layer, "non-line entity on leg layer ignored");
        return None;
    };
    let start = Point2::new(line.p1.x, line.p1.y);
    let end = Point2::new(line.p2.x, line.p2.y);
    if PointKey::new(&start) == PointKey::new(&end) {
        debug!(x = start.x, y = start.y, "zero-length leg dropped");
        return None;
    }
    Some(Leg::new(start, end))
}

fn convert_polyline(entity: &Entity, prefix: &str, layer_line_type: Option<&str>) -> Option<StyledPolyline> {
    let points: Vec<Point2> = match &entity.specific {
        EntityType::Polyline(poly) => poly
            .vertices()
            .map(|v| Point2::new(v.location.x, v.location.y))
            .collect(),
        EntityType::LwPolyline(lwpoly) => lwpoly
            .vertices
            .iter()
            .map(|v| Point2::new(v.x, v.y))
            .collect(),
        _ => return None,
    };

    let distinct: HashSet<PointKey> = points.iter().map(PointKey::from).collect();
    if distinct.len() < 2 {
        debug!(layer = %entity.common.layer, points = points.len(), "degenerate polyline dropped");
        return None;
    }

    let layer = entity.common.layer.clone();
    let node_type = resolve_type(&entity.common.line_type_name, layer_line_type, &layer, prefix);
    Some(StyledPolyline::new(points, node_type, layer))
}

/// 线型 → 图层线型 → 图层名后缀 → 洞壁
fn resolve_type(line_type: &str, layer_line_type: Option<&str>, layer: &str, prefix: &str) -> NodeType {
    let suffix = layer
        .get(prefix.len()..)
        .unwrap_or_default()
        .trim_start_matches(['_', '-']);

    [Some(line_type), layer_line_type, Some(suffix)]
        .into_iter()
        .flatten()
        .find_map(NodeType::from_known_tag)
        .unwrap_or_else(|| {
            // 未登记的 L_/A_ 线型原样保留
            let upper = line_type.to_ascii_uppercase();
            if upper.starts_with("L_") || upper.starts_with("A_") {
                NodeType::Other(line_type.to_string())
            } else {
                NodeType::Wall
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxf::entities::{Line, LwPolyline, ModelPoint, Text};
    use dxf::{LwPolylineVertex, Point};

    fn on_layer(specific: EntityType, layer: &str) -> Entity {
        let mut entity = Entity::new(specific);
        entity.common.layer = layer.to_string();
        entity
    }

    fn text(value: &str) -> Entity {
        let mut text = Text::default();
        text.value = value.to_string();
        on_layer(EntityType::Text(text), "STATION")
    }

    fn line(layer: &str, a: (f64, f64), b: (f64, f64)) -> Entity {
        on_layer(
            EntityType::Line(Line::new(Point::new(a.0, a.1, 0.0), Point::new(b.0, b.1, 0.0))),
            layer,
        )
    }

    fn point(layer: &str, at: (f64, f64)) -> Entity {
        let mut point = ModelPoint::default();
        point.location = Point::new(at.0, at.1, 0.0);
        on_layer(EntityType::ModelPoint(point), layer)
    }

    fn lwpolyline(layer: &str, line_type: &str, points: &[(f64, f64)]) -> Entity {
        let mut poly = LwPolyline::default();
        poly.vertices = points
            .iter()
            .map(|&(x, y)| {
                let mut vertex = LwPolylineVertex::default();
                vertex.x = x;
                vertex.y = y;
                vertex
            })
            .collect();
        let mut entity = on_layer(EntityType::LwPolyline(poly), layer);
        entity.common.line_type_name = line_type.to_string();
        entity
    }

    fn drawing(entities: Vec<Entity>) -> dxf::Drawing {
        let mut drawing = dxf::Drawing::new();
        for entity in entities {
            drawing.add_entity(entity);
        }
        drawing
    }

    #[test]
    fn test_two_station_survey() {
        let drawing = drawing(vec![
            text("0"),
            line("STATION", (100.0, 50.0), (100.5, 50.5)),
            text("1"),
            point("STATION", (110.0, 50.0)),
            line("LEG", (100.0, 50.0), (110.0, 50.0)),
            line("NOTES", (0.0, 0.0), (1.0, 1.0)),
        ]);

        let entities = extract(&drawing, &LayerConventions::default()).unwrap();
        assert_eq!(entities.stations.len(), 2);
        assert_eq!(entities.station("0").unwrap().point, Point2::new(100.0, 50.0));
        assert_eq!(entities.station("1").unwrap().point, Point2::new(110.0, 50.0));
        assert_eq!(entities.legs.len(), 1);
        assert!(entities.polylines.is_empty());
    }

    #[test]
    fn test_label_without_coordinate_is_malformed() {
        let drawing = drawing(vec![text("0"), text("1"), line("STATION", (0.0, 0.0), (1.0, 0.0))]);
        let err = extract(&drawing, &LayerConventions::default()).unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput(_)));

        let trailing = self::drawing(vec![text("5")]);
        assert!(extract(&trailing, &LayerConventions::default()).is_err());
    }

    #[test]
    fn test_orphan_coordinate_is_ignored() {
        let drawing = drawing(vec![
            line("STATION", (9.0, 9.0), (9.0, 10.0)),
            text("0"),
            line("STATION", (0.0, 0.0), (1.0, 0.0)),
        ]);
        let entities = extract(&drawing, &LayerConventions::default()).unwrap();
        assert_eq!(entities.stations.len(), 1);
        assert_eq!(entities.stations[0].point, Point2::origin());
    }

    #[test]
    fn test_duplicate_station_id_is_malformed() {
        let drawing = drawing(vec![
            text("3"),
            line("STATION", (0.0, 0.0), (1.0, 0.0)),
            text("3"),
            line("STATION", (5.0, 0.0), (6.0, 0.0)),
        ]);
        let err = extract(&drawing, &LayerConventions::default()).unwrap_err();
        assert_eq!(err, CoreError::MalformedInput("duplicate station id '3'".into()));
    }

    #[test]
    fn test_polyline_types_and_degenerates() {
        let drawing = drawing(vec![
            lwpolyline("SCRAP_0", "L_wall-presumed", &[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]),
            lwpolyline("SCRAP_pit", "BYLAYER", &[(0.0, 0.0), (1.0, 0.0)]),
            lwpolyline("SCRAP_0", "CONTINUOUS", &[(0.0, 0.0), (3.0, 0.0)]),
            lwpolyline("SCRAP_0", "L_stalactite", &[(0.0, 0.0), (3.0, 0.0)]),
            lwpolyline("SCRAP_0", "L_wall", &[(4.0, 4.0), (4.0, 4.0)]),
            line("LEG", (2.0, 2.0), (2.0, 2.0)),
        ]);

        let entities = extract(&drawing, &LayerConventions::default()).unwrap();
        let types: Vec<_> = entities.polylines.iter().map(|p| p.node_type.clone()).collect();
        assert_eq!(
            types,
            vec![
                NodeType::WallPresumed,
                NodeType::Pit,
                NodeType::Wall,
                NodeType::Other("L_stalactite".into()),
            ]
        );
        assert_eq!(entities.polylines[0].points.len(), 3);
        assert!(entities.legs.is_empty());
    }

    #[test]
    fn test_custom_layer_names() {
        let conventions = LayerConventions {
            station_layer: "CAPOSALDI".into(),
            leg_layer: "POLIGONALE".into(),
            polyline_layers: vec!["DISEGNO".into()],
        };
        let mut station = text("0");
        station.common.layer = "caposaldi".into();
        let drawing = drawing(vec![
            station,
            line("CAPOSALDI", (1.0, 2.0), (1.0, 3.0)),
            line("POLIGONALE", (1.0, 2.0), (4.0, 6.0)),
            lwpolyline("DISEGNO", "A_water", &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]),
            lwpolyline("SCRAP_0", "L_wall", &[(0.0, 0.0), (1.0, 0.0)]),
        ]);

        let entities = extract(&drawing, &conventions).unwrap();
        assert_eq!(entities.stations.len(), 1);
        assert_eq!(entities.legs.len(), 1);
        assert_eq!(entities.polylines.len(), 1);
        assert_eq!(entities.polylines[0].node_type, NodeType::Water);
    }

    #[test]
    fn test_resolve_type_order() {
        assert_eq!(resolve_type("L_slope", Some("L_border"), "SCRAP_pit", "SCRAP"), NodeType::Slope);
        assert_eq!(resolve_type("BYLAYER", Some("L_border"), "SCRAP_pit", "SCRAP"), NodeType::Border);
        assert_eq!(resolve_type("BYLAYER", Some("CONTINUOUS"), "SCRAP_pit", "SCRAP"), NodeType::Pit);
        assert_eq!(resolve_type("BYLAYER", None, "SCRAP", "SCRAP"), NodeType::Wall);
    }
}

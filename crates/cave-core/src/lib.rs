//! Cave Sketch 核心
//!
//! 把测绘图纸中的测站、测线和多段线组织成带语义类型的节点图，
//! 并提供样式表、绘图配置和经纬度投影。
//!
//! # 架构设计
//!
//! - `graph`: 抽取结果 → 节点表
//! - `node`: 节点与节点表（平面表的内存形式）
//! - `style`: 语义类型 → 绘图样式
//! - `geo`: 局部坐标 → 经纬度
//!
//! # 示例
//!
//! ```rust
//! use cave_core::prelude::*;
//!
//! let entities = SurveyEntities {
//!     stations: vec![
//!         Station::new("0", Point2::new(100.0, 50.0)),
//!         Station::new("1", Point2::new(110.0, 50.0)),
//!     ],
//!     legs: vec![Leg::new(Point2::new(100.0, 50.0), Point2::new(110.0, 50.0))],
//!     polylines: vec![],
//! };
//!
//! let table = build(&entities, &BuildOptions::default()).unwrap();
//! assert_eq!(table.position("1"), Some(Point2::new(10.0, 0.0)));
//! ```

pub mod config;
pub mod error;
pub mod geo;
pub mod graph;
pub mod math;
pub mod node;
pub mod properties;
pub mod style;
pub mod transform;

pub use error::{CoreError, CoreResult};

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::config::DrawingConfig;
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::geo::{project, GeoMap, GeoTable, ReferencePoint};
    pub use crate::graph::{build, BuildOptions, Leg, Station, StyledPolyline, SurveyEntities};
    pub use crate::math::{BoundingBox2, Point2, Vector2};
    pub use crate::node::{Node, NodeId, NodeTable, NodeType};
    pub use crate::properties::{Color, LineType, WidthTier};
    pub use crate::style::{Style, StyleKind, StyleTable};
    pub use crate::transform::Transform2D;
}

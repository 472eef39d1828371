//! 数学基础类型
//!
//! 基于 nalgebra 提供的向量和点类型的别名，以及用于坐标匹配的定点键。

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// 2D点类型
pub type Point2 = na::Point2<f64>;

/// 2D向量类型
pub type Vector2 = na::Vector2<f64>;

/// 2D变换矩阵
pub type Matrix3 = na::Matrix3<f64>;

/// 几何比较的容差
pub const EPSILON: f64 = 1e-10;

#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

#[inline]
pub fn points_approx_eq(a: &Point2, b: &Point2) -> bool {
    (a - b).norm() < EPSILON
}

/// 坐标匹配使用的小数位数（DXF 组码实数的常见输出精度）
pub const KEY_DECIMALS: u32 = 6;

/// 定点坐标键
///
/// 把浮点坐标按固定小数位取整后作为哈希键，测线端点与测站坐标通过它连接。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey {
    x: i64,
    y: i64,
}

impl PointKey {
    /// 以指定小数位数量化坐标
    pub fn with_decimals(point: &Point2, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        Self {
            x: (point.x * factor).round() as i64,
            y: (point.y * factor).round() as i64,
        }
    }

    /// 以默认精度量化坐标
    pub fn new(point: &Point2) -> Self {
        Self::with_decimals(point, KEY_DECIMALS)
    }
}

impl From<&Point2> for PointKey {
    fn from(point: &Point2) -> Self {
        Self::new(point)
    }
}

/// 轴对齐包围盒
///
/// `empty()` 的 min 大于 max，加入第一个点后才有效。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self::new(
            Point2::new(f64::INFINITY, f64::INFINITY),
            Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        )
    }

    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        points.into_iter().fold(Self::empty(), |mut bbox, p| {
            bbox.expand_to_include(&p);
            bbox
        })
    }

    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y)
    }

    pub fn expand_to_include(&mut self, point: &Point2) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// 四周各外扩 `margin`
    pub fn inflate(&self, margin: f64) -> Self {
        let m = Vector2::new(margin, margin);
        Self::new(self.min - m, self.max + m)
    }

    /// 边界上的点也算包含
    pub fn contains(&self, point: &Point2) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }

    pub fn center(&self) -> Point2 {
        na::center(&self.min, &self.max)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// 宽高中的较大者，即渲染的参考尺度
    pub fn max_span(&self) -> f64 {
        self.width().max(self.height())
    }
}

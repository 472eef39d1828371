//! 2D变换
//!
//! 测绘图只用到刚体变换：平面图绕质心旋转、指北针绕自身中心旋转。

use crate::math::{Matrix3, Point2};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// 齐次坐标下的2D刚体变换
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    matrix: Matrix3,
}

impl Transform2D {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// 绕 `center` 逆时针旋转 `radians`
    ///
    /// 等价于 平移到原点 → 旋转 → 平移回去，直接写成一个矩阵。
    pub fn rotation_around(center: Point2, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        let (cx, cy) = (center.x, center.y);
        #[rustfmt::skip]
        let matrix = Matrix3::new(
            cos, -sin, cx - cos * cx + sin * cy,
            sin,  cos, cy - sin * cx - cos * cy,
            0.0,  0.0, 1.0,
        );
        Self { matrix }
    }

    /// 同 [`Self::rotation_around`]，角度制
    pub fn rotation_around_degrees(center: Point2, degrees: f64) -> Self {
        Self::rotation_around(center, degrees.to_radians())
    }

    pub fn transform_point(&self, point: &Point2) -> Point2 {
        let v = self.matrix * Vector3::new(point.x, point.y, 1.0);
        Point2::new(v.x, v.y)
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

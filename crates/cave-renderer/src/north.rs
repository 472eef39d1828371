//! 指北针
//!
//! 双色三角形内接于圆。平面图旋转后，三角形绕自身中心同角度旋转，保持指向真北。

use crate::canvas::{Canvas, Stroke};
use cave_core::math::Point2;
use cave_core::properties::Color;
use cave_core::transform::Transform2D;

const OUTLINE_WIDTH: f64 = 0.8;

/// 指北针几何
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NorthArrow {
    /// 三角形底边中点
    pub base: Point2,
    /// 箭头总长，即外圆直径
    pub length: f64,
    pub rotation_deg: f64,
}

impl NorthArrow {
    pub fn center(&self) -> Point2 {
        Point2::new(self.base.x, self.base.y + self.length / 2.0)
    }

    /// 旋转后的 `[底点, 左翼, 右翼, 顶点]`
    pub fn vertices(&self) -> [Point2; 4] {
        let unit = self.length / 5.0;
        let (x, y) = (self.base.x, self.base.y);
        let raw = [
            Point2::new(x, y),
            Point2::new(x - unit, y + unit),
            Point2::new(x + unit, y + unit),
            Point2::new(x, y + self.length),
        ];
        if self.rotation_deg == 0.0 {
            return raw;
        }
        let t = Transform2D::rotation_around_degrees(self.center(), self.rotation_deg);
        raw.map(|p| t.transform_point(&p))
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let [base, left, right, top] = self.vertices();
        let outline = Stroke::solid(Color::BLACK, OUTLINE_WIDTH);

        canvas.draw_polygon(&[base, right, top], Color::BLACK, None);
        canvas.draw_polygon(&[base, left, top], Color::WHITE, Some(&outline));
        canvas.draw_circle(self.center(), self.length / 2.0, &outline);
    }
}

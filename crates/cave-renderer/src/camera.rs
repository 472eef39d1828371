//! 2D相机
//!
//! 把世界坐标（米，y 向上）映射到页面框（毫米，y 向下）。

use cave_core::math::{BoundingBox2, Point2};

/// 2D相机
#[derive(Debug, Clone)]
pub struct Camera2D {
    /// 相机中心位置（世界坐标）
    pub center: Point2,

    /// 缩放级别（毫米/米）
    pub zoom: f64,

    /// 视口在页面上的范围（毫米）
    pub viewport: BoundingBox2,
}

impl Camera2D {
    /// 创建新的相机
    pub fn new(viewport: BoundingBox2) -> Self {
        Self {
            center: Point2::origin(),
            zoom: 1.0,
            viewport,
        }
    }

    /// 缩放到指定区域，保持等比例
    pub fn zoom_to_fit(&mut self, bbox: &BoundingBox2, padding: f64) {
        let width = bbox.width() + padding * 2.0;
        let height = bbox.height() + padding * 2.0;

        let zoom_x = if width > 0.0 { self.viewport.width() / width } else { f64::INFINITY };
        let zoom_y = if height > 0.0 { self.viewport.height() / height } else { f64::INFINITY };
        let zoom = zoom_x.min(zoom_y);

        self.zoom = if zoom.is_finite() { zoom } else { 1.0 };
        self.center = bbox.center();
    }

    /// 世界坐标转页面坐标
    pub fn world_to_screen(&self, world: Point2) -> Point2 {
        let page_center = self.viewport.center();
        let x = (world.x - self.center.x) * self.zoom + page_center.x;
        let y = page_center.y - (world.y - self.center.y) * self.zoom;
        Point2::new(x, y)
    }

    /// 世界长度转页面长度
    pub fn scale_length(&self, length: f64) -> f64 {
        length * self.zoom
    }
}

//! 比例尺
//!
//! 黑白交替的分段条，总长以米计，居中标注长度。

use crate::canvas::{Canvas, HAlign, Stroke, TextStyle, VAlign};
use cave_core::math::Point2;
use cave_core::properties::Color;
use serde::{Deserialize, Serialize};

/// 比例尺方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleOrientation {
    Horizontal,
    Vertical,
}

/// 标注字号（pt）
const LABEL_SIZE: f64 = 10.0;

/// 分段边框线宽（pt）
const OUTLINE_WIDTH: f64 = 0.5;

/// 比例尺几何
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRule {
    /// 起点（水平时为左下角，竖直时为左下角）
    pub origin: Point2,
    /// 总长（米）
    pub length: f64,
    /// 单段长度（米）
    pub segment_length: f64,
    /// 条的厚度（世界单位）
    pub thickness: f64,
    /// 标注与条之间的距离（世界单位）
    pub label_gap: f64,
    pub orientation: RuleOrientation,
}

impl ScaleRule {
    pub fn segment_count(&self) -> usize {
        (self.length / self.segment_length).round() as usize
    }

    /// 各分段的四个角点
    pub fn segments(&self) -> Vec<[Point2; 4]> {
        (0..self.segment_count())
            .map(|i| {
                let offset = i as f64 * self.segment_length;
                let (x, y, w, h) = match self.orientation {
                    RuleOrientation::Horizontal => (
                        self.origin.x + offset,
                        self.origin.y,
                        self.segment_length,
                        self.thickness,
                    ),
                    RuleOrientation::Vertical => (
                        self.origin.x,
                        self.origin.y + offset,
                        self.thickness,
                        self.segment_length,
                    ),
                };
                [
                    Point2::new(x, y),
                    Point2::new(x + w, y),
                    Point2::new(x + w, y + h),
                    Point2::new(x, y + h),
                ]
            })
            .collect()
    }

    pub fn label(&self) -> String {
        format!("{} m", self.length)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let outline = Stroke::solid(Color::BLACK, OUTLINE_WIDTH);
        for (i, corners) in self.segments().iter().enumerate() {
            let fill = if i % 2 == 0 { Color::BLACK } else { Color::WHITE };
            canvas.draw_polygon(corners, fill, Some(&outline));
        }

        match self.orientation {
            RuleOrientation::Horizontal => canvas.draw_text(
                Point2::new(self.origin.x + self.length / 2.0, self.origin.y - self.label_gap),
                &self.label(),
                &TextStyle::new(LABEL_SIZE, Color::BLACK, HAlign::Center, VAlign::Top),
            ),
            RuleOrientation::Vertical => canvas.draw_text(
                Point2::new(self.origin.x - self.label_gap, self.origin.y + self.length / 2.0),
                &self.label(),
                &TextStyle::new(LABEL_SIZE, Color::BLACK, HAlign::Center, VAlign::Center)
                    .rotated(90.0),
            ),
        }
    }
}

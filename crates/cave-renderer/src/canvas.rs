//! 绘图画布抽象
//!
//! 渲染器只依赖"画点、画线段、画多边形、画圆、写文字"五个原语。
//! 位置使用世界坐标（米），尺寸（标记、线宽、字号）使用页面点（pt）。

use cave_core::math::{BoundingBox2, Point2};
use cave_core::properties::Color;
use serde::{Deserialize, Serialize};

/// 线条样式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    /// 线宽（pt）
    pub width: f64,
    /// 虚线数组（pt），空表示实线
    pub dash: Vec<f64>,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: Vec::new(),
        }
    }
}

/// 水平对齐
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// 垂直对齐
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// 文字样式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// 字号（pt）
    pub size: f64,
    pub color: Color,
    pub h_align: HAlign,
    pub v_align: VAlign,
    /// 逆时针旋转角度
    pub rotation_deg: f64,
}

impl TextStyle {
    pub fn new(size: f64, color: Color, h_align: HAlign, v_align: VAlign) -> Self {
        Self {
            size,
            color,
            h_align,
            v_align,
            rotation_deg: 0.0,
        }
    }

    pub fn rotated(mut self, rotation_deg: f64) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }
}

/// 绘图目标
pub trait Canvas {
    /// 圆形标记，`area` 为标记面积（pt²），直径为 `sqrt(area)`
    fn draw_point(&mut self, at: Point2, area: f64, color: Color);

    fn draw_segment(&mut self, from: Point2, to: Point2, stroke: &Stroke);

    /// 填充多边形，自动闭合
    fn draw_polygon(&mut self, points: &[Point2], fill: Color, outline: Option<&Stroke>);

    /// 空心圆，半径为世界坐标
    fn draw_circle(&mut self, center: Point2, radius: f64, stroke: &Stroke);

    fn draw_text(&mut self, at: Point2, text: &str, style: &TextStyle);
}

/// 绘图指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Point {
        at: Point2,
        area: f64,
        color: Color,
    },
    Segment {
        from: Point2,
        to: Point2,
        stroke: Stroke,
    },
    Polygon {
        points: Vec<Point2>,
        fill: Color,
        outline: Option<Stroke>,
    },
    Circle {
        center: Point2,
        radius: f64,
        stroke: Stroke,
    },
    Text {
        at: Point2,
        text: String,
        style: TextStyle,
    },
}

/// 记录绘图指令的画布
///
/// 页面排版与序列化都基于它。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// 所有指令几何的世界坐标范围（文字只计锚点）
    pub fn bounds(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::empty();
        for command in &self.commands {
            match command {
                DrawCommand::Point { at, .. } | DrawCommand::Text { at, .. } => {
                    bbox.expand_to_include(at)
                }
                DrawCommand::Segment { from, to, .. } => {
                    bbox.expand_to_include(from);
                    bbox.expand_to_include(to);
                }
                DrawCommand::Polygon { points, .. } => {
                    points.iter().for_each(|p| bbox.expand_to_include(p))
                }
                DrawCommand::Circle { center, radius, .. } => {
                    bbox.expand_to_include(&Point2::new(center.x - radius, center.y - radius));
                    bbox.expand_to_include(&Point2::new(center.x + radius, center.y + radius));
                }
            }
        }
        bbox
    }

    pub fn segments(&self) -> impl Iterator<Item = (&Point2, &Point2, &Stroke)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Segment { from, to, stroke } => Some((from, to, stroke)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = (&Point2, &str)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { at, text, .. } => Some((at, text.as_str())),
            _ => None,
        })
    }
}

impl Canvas for DisplayList {
    fn draw_point(&mut self, at: Point2, area: f64, color: Color) {
        self.commands.push(DrawCommand::Point { at, area, color });
    }

    fn draw_segment(&mut self, from: Point2, to: Point2, stroke: &Stroke) {
        self.commands.push(DrawCommand::Segment {
            from,
            to,
            stroke: stroke.clone(),
        });
    }

    fn draw_polygon(&mut self, points: &[Point2], fill: Color, outline: Option<&Stroke>) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            fill,
            outline: outline.cloned(),
        });
    }

    fn draw_circle(&mut self, center: Point2, radius: f64, stroke: &Stroke) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            stroke: stroke.clone(),
        });
    }

    fn draw_text(&mut self, at: Point2, text: &str, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            at,
            text: text.to_string(),
            style: style.clone(),
        });
    }
}

//! 语义类型到绘图样式的映射
//!
//! 样式表是不可变的值，页面渲染器和地图图层各自持有一份引用。

use crate::node::NodeType;
use crate::properties::{Color, LineType, WidthTier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 样式的几何种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleKind {
    /// 按线段绘制
    Line,
    /// 按填充面绘制
    Area,
}

/// 单个语义类型的样式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub kind: StyleKind,
    pub color: Color,
    pub line_type: LineType,
    pub width: WidthTier,
}

impl Style {
    pub fn line(color: Color, line_type: LineType, width: WidthTier) -> Self {
        Self {
            kind: StyleKind::Line,
            color,
            line_type,
            width,
        }
    }

    pub fn area(color: Color) -> Self {
        Self {
            kind: StyleKind::Area,
            color,
            line_type: LineType::Continuous,
            width: WidthTier::Thin,
        }
    }

    pub fn is_area(&self) -> bool {
        self.kind == StyleKind::Area
    }
}

/// 样式表
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTable {
    styles: HashMap<NodeType, Style>,
    fallback: Style,
}

impl StyleTable {
    /// 以指定的回退样式创建空表
    pub fn with_fallback(fallback: Style) -> Self {
        Self {
            styles: HashMap::new(),
            fallback,
        }
    }

    /// 设置某一类型的样式
    pub fn with_style(mut self, node_type: NodeType, style: Style) -> Self {
        self.styles.insert(node_type, style);
        self
    }

    /// 查询样式，未登记的类型回退到主洞壁样式
    pub fn style_for(&self, node_type: &NodeType) -> &Style {
        self.styles.get(node_type).unwrap_or(&self.fallback)
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        let wall = Style::line(Color::BLACK, LineType::Continuous, WidthTier::Thick);
        let sparse_dots = LineType::Dotted { on: 1.0, off: 2.0 };
        let dense_dots = LineType::Dotted { on: 1.0, off: 1.0 };

        Self::with_fallback(wall.clone())
            .with_style(
                NodeType::Station,
                Style::line(Color::GRAY, LineType::Continuous, WidthTier::Thin),
            )
            .with_style(NodeType::Wall, wall.clone())
            .with_style(NodeType::Slope, wall)
            .with_style(
                NodeType::Chimney,
                Style::line(Color::INDIGO, sparse_dots.clone(), WidthTier::Thick),
            )
            .with_style(
                NodeType::Border,
                Style::line(Color::GREEN, LineType::Continuous, WidthTier::Thick),
            )
            .with_style(
                NodeType::Pit,
                Style::line(Color::INDIGO, dense_dots, WidthTier::Thick),
            )
            .with_style(
                NodeType::WallPresumed,
                Style::line(Color::BLACK, sparse_dots, WidthTier::Thick),
            )
            .with_style(NodeType::Water, Style::area(Color::BLUE.with_opacity(0.3)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_styles() {
        let styles = StyleTable::default();
        assert!(styles.style_for(&NodeType::Water).is_area());
        assert_eq!(styles.style_for(&NodeType::Station).width, WidthTier::Thin);
        assert_eq!(styles.style_for(&NodeType::Chimney).color, Color::INDIGO);
    }

    #[test]
    fn test_unknown_type_falls_back_to_wall() {
        let styles = StyleTable::default();
        let unknown = styles.style_for(&NodeType::Other("flowstone".into()));
        assert_eq!(unknown, styles.style_for(&NodeType::Wall));
        assert_eq!(unknown.kind, StyleKind::Line);
    }
}

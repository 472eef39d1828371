//! 测绘图渲染
//!
//! 把节点表画到调用方提供的画布上：测站标记与编号、按样式绘制的连线或填充面、
//! 比例尺和指北针。所有可见尺寸都按参考尺度归一化，再乘以 `10^zoom`。

use crate::canvas::{Canvas, HAlign, Stroke, TextStyle, VAlign};
use crate::north::NorthArrow;
use crate::rule::{RuleOrientation, ScaleRule};
use cave_core::config::DrawingConfig;
use cave_core::error::CoreResult;
use cave_core::math::{BoundingBox2, Point2};
use cave_core::node::{NodeId, NodeTable};
use cave_core::properties::{Color, WidthTier};
use cave_core::style::StyleTable;
use std::collections::HashSet;
use tracing::debug;

/// 不参与绘制的节点集合
pub type Exclusions = HashSet<NodeId>;

const MARKER_BASE: f64 = 300.0;
const TEXT_BASE: f64 = 300.0;
const THIN_LINE_BASE: f64 = 15.0;
const THICK_LINE_BASE: f64 = 30.0;

/// 由参考尺度和缩放指数得到的各项尺寸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderScale {
    /// 坐标范围宽高中的较大者
    pub ref_scale: f64,
    pub marker_size: f64,
    pub text_size: f64,
    pub thin_width: f64,
    pub thick_width: f64,
}

impl RenderScale {
    pub fn new(ref_scale: f64, config: &DrawingConfig) -> Self {
        let sized = |base: f64, zoom: f64| base / ref_scale * 10f64.powf(zoom);
        Self {
            ref_scale,
            marker_size: sized(MARKER_BASE, config.marker_zoom),
            text_size: sized(TEXT_BASE, config.text_zoom),
            thin_width: sized(THIN_LINE_BASE, config.line_width_zoom),
            thick_width: sized(THICK_LINE_BASE, config.line_width_zoom),
        }
    }

    /// 从坐标范围计算；退化的范围按 1 处理
    pub fn for_bounds(bounds: &BoundingBox2, config: &DrawingConfig) -> Self {
        let span = if bounds.is_empty() { 0.0 } else { bounds.max_span() };
        let ref_scale = if span > 0.0 && span.is_finite() { span } else { 1.0 };
        Self::new(ref_scale, config)
    }

    pub fn line_width(&self, tier: WidthTier) -> f64 {
        match tier {
            WidthTier::Thin => self.thin_width,
            WidthTier::Thick => self.thick_width,
        }
    }
}

/// 单个视图的绘制选项
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotView {
    /// 比例尺方向，`None` 表示不画比例尺
    pub rule: Option<RuleOrientation>,
    pub north: bool,
    pub rotation_deg: i32,
}

impl PlotView {
    /// 平面图：水平比例尺 + 指北针 + 旋转
    pub fn plan(rotation_deg: i32) -> Self {
        Self {
            rule: Some(RuleOrientation::Horizontal),
            north: true,
            rotation_deg,
        }
    }

    /// 剖面图：竖直比例尺，不旋转
    pub fn section() -> Self {
        Self {
            rule: Some(RuleOrientation::Vertical),
            north: false,
            rotation_deg: 0,
        }
    }
}

/// 一次绘制的结果摘要
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLayout {
    pub scale: RenderScale,
    /// 旋转后节点的坐标范围
    pub extent: BoundingBox2,
    pub rule: Option<ScaleRule>,
    pub north: Option<NorthArrow>,
}

/// 测绘图渲染器
#[derive(Debug, Clone, Copy)]
pub struct SurveyRenderer<'a> {
    styles: &'a StyleTable,
}

impl<'a> SurveyRenderer<'a> {
    pub fn new(styles: &'a StyleTable) -> Self {
        Self { styles }
    }

    /// 绘制节点表
    ///
    /// 原表不会被修改；旋转作用于副本。不存在或被排除的邻接节点直接跳过。
    pub fn render(
        &self,
        table: &NodeTable,
        config: &DrawingConfig,
        view: &PlotView,
        excluded: &Exclusions,
        canvas: &mut dyn Canvas,
    ) -> CoreResult<PlotLayout> {
        let segment_length = config.rule_segment_length()?;

        let rotated;
        let table = if view.rotation_deg != 0 {
            rotated = table.rotated(view.rotation_deg as f64);
            &rotated
        } else {
            table
        };

        let extent = table.bounds();
        let scale = RenderScale::for_bounds(&extent, config);
        self.draw_nodes(table, config, &scale, excluded, canvas);

        if extent.is_empty() {
            return Ok(PlotLayout {
                scale,
                extent,
                rule: None,
                north: None,
            });
        }

        let ref_scale = scale.ref_scale;
        let rule = view.rule.map(|orientation| {
            let origin = match orientation {
                RuleOrientation::Horizontal => {
                    Point2::new(extent.min.x, extent.min.y - ref_scale * 0.1)
                }
                RuleOrientation::Vertical => {
                    Point2::new(extent.min.x - ref_scale * 0.03, extent.min.y)
                }
            };
            ScaleRule {
                origin,
                length: config.rule_length_m,
                segment_length,
                thickness: ref_scale * 0.005,
                label_gap: ref_scale * 0.02,
                orientation,
            }
        });
        if let Some(rule) = &rule {
            rule.draw(canvas);
        }

        let north = view.north.then(|| {
            let anchor = rule
                .map(|r| r.origin)
                .unwrap_or(Point2::new(extent.min.x, extent.min.y - ref_scale * 0.1));
            NorthArrow {
                base: Point2::new(
                    anchor.x + config.rule_length_m / 2.0,
                    anchor.y + ref_scale * 0.025,
                ),
                length: ref_scale * 0.07,
                rotation_deg: view.rotation_deg as f64,
            }
        });
        if let Some(north) = &north {
            north.draw(canvas);
        }

        Ok(PlotLayout {
            scale,
            extent,
            rule,
            north,
        })
    }

    fn draw_nodes(
        &self,
        table: &NodeTable,
        config: &DrawingConfig,
        scale: &RenderScale,
        excluded: &Exclusions,
        canvas: &mut dyn Canvas,
    ) {
        let label_style = TextStyle::new(scale.text_size, Color::BLACK, HAlign::Right, VAlign::Bottom);
        let mut skipped = 0usize;

        for node in table {
            if excluded.contains(node.id.as_str()) {
                continue;
            }

            if node.is_station() && config.show_markers {
                canvas.draw_point(node.position, scale.marker_size, Color::RED);
                canvas.draw_text(node.position, node.id.as_str(), &label_style);
            }

            let style = self.styles.style_for(&node.node_type);
            let neighbors: Vec<Point2> = table
                .resolved_links(node)
                .filter(|n| !excluded.contains(n.id.as_str()))
                .map(|n| n.position)
                .collect();
            skipped += node.links().len() - neighbors.len();

            // 顶点足够时面样式填充，否则与线样式一样逐段绘制
            if style.is_area() && neighbors.len() >= 3 {
                let mut ring = Vec::with_capacity(neighbors.len() + 1);
                ring.push(node.position);
                ring.extend(neighbors);
                canvas.draw_polygon(&ring, style.color, None);
                continue;
            }

            let width = scale.line_width(style.width);
            let stroke = Stroke {
                color: style.color,
                width,
                dash: style.line_type.dash_array(width),
            };
            for neighbor in neighbors {
                canvas.draw_segment(node.position, neighbor, &stroke);
            }
        }

        if skipped > 0 {
            debug!(skipped, "links to excluded or missing nodes were not drawn");
        }
    }
}

//! 页面排版
//!
//! 在一张 A4 纵向页面上从上到下排列剖面图和平面图，共用页面标题。

use crate::canvas::DisplayList;
use crate::plot::{Exclusions, PlotLayout, PlotView, SurveyRenderer};
use cave_core::config::DrawingConfig;
use cave_core::error::{CoreError, CoreResult};
use cave_core::math::{BoundingBox2, Point2};
use cave_core::node::NodeTable;
use cave_core::style::StyleTable;
use tracing::info;

/// A4 纵向页面宽度（毫米）
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// A4 纵向页面高度（毫米）
pub const PAGE_HEIGHT_MM: f64 = 297.0;

/// 标题区占页面高度的比例
const TITLE_BAND: f64 = 0.12;
const MARGIN_MM: f64 = 12.0;
const PANEL_GAP_MM: f64 = 10.0;
/// 子图标题区高度
const PANEL_TITLE_MM: f64 = 8.0;

/// 视图种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    Section,
    Plan,
}

impl PanelKind {
    pub fn title(&self) -> &'static str {
        match self {
            PanelKind::Section => "Sezione",
            PanelKind::Plan => "Pianta",
        }
    }
}

/// 页面上的一个子图
#[derive(Debug, Clone)]
pub struct Panel {
    pub kind: PanelKind,
    pub title: String,
    /// 子图标题的位置（页面毫米，y 向下）
    pub title_anchor: Point2,
    /// 绘图区（页面毫米，y 向下）
    pub frame: BoundingBox2,
    pub layout: PlotLayout,
    pub drawing: DisplayList,
}

impl Panel {
    /// 绘图内容的世界坐标范围
    pub fn world_extent(&self) -> BoundingBox2 {
        self.drawing.bounds()
    }
}

/// 排版好的页面
#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    pub width_mm: f64,
    pub height_mm: f64,
    /// 页面标题位置（页面毫米，y 向下）
    pub title_anchor: Point2,
    pub panels: Vec<Panel>,
}

impl Page {
    pub fn panel(&self, kind: PanelKind) -> Option<&Panel> {
        self.panels.iter().find(|p| p.kind == kind)
    }
}

/// 组合平面图与剖面图
pub fn compose(
    title: &str,
    plan: Option<&NodeTable>,
    section: Option<&NodeTable>,
    config: &DrawingConfig,
    excluded: &Exclusions,
    styles: &StyleTable,
) -> CoreResult<Page> {
    if plan.is_none() && section.is_none() {
        return Err(CoreError::NoInput);
    }
    config.validate()?;
    for (name, table) in [("plan", plan), ("section", section)] {
        if table.is_some_and(NodeTable::is_empty) {
            return Err(CoreError::Configuration(format!("{name} table is empty")));
        }
    }

    let views: Vec<(PanelKind, &NodeTable, PlotView)> = [
        section.map(|t| (PanelKind::Section, t, PlotView::section())),
        plan.map(|t| (PanelKind::Plan, t, PlotView::plan(config.rotation_deg))),
    ]
    .into_iter()
    .flatten()
    .collect();

    let frames = panel_frames(views.len());
    let renderer = SurveyRenderer::new(styles);
    let mut panels = Vec::with_capacity(views.len());
    for ((kind, table, view), frame) in views.into_iter().zip(frames) {
        let mut drawing = DisplayList::new();
        let layout = renderer.render(table, config, &view, excluded, &mut drawing)?;
        panels.push(Panel {
            kind,
            title: kind.title().to_string(),
            title_anchor: Point2::new(PAGE_WIDTH_MM / 2.0, frame.min.y - PANEL_TITLE_MM / 2.0),
            frame,
            layout,
            drawing,
        });
    }

    info!(title, panels = panels.len(), "survey page composed");
    Ok(Page {
        title: title.to_string(),
        width_mm: PAGE_WIDTH_MM,
        height_mm: PAGE_HEIGHT_MM,
        title_anchor: Point2::new(PAGE_WIDTH_MM / 2.0, PAGE_HEIGHT_MM * 0.05),
        panels,
    })
}

/// 均分可用高度，每块扣除子图标题区
fn panel_frames(count: usize) -> Vec<BoundingBox2> {
    let top = PAGE_HEIGHT_MM * TITLE_BAND;
    let bottom = PAGE_HEIGHT_MM - MARGIN_MM;
    let n = count as f64;
    let slot = (bottom - top - PANEL_GAP_MM * (n - 1.0)) / n;

    (0..count)
        .map(|i| {
            let y0 = top + i as f64 * (slot + PANEL_GAP_MM);
            BoundingBox2::new(
                Point2::new(MARGIN_MM, y0 + PANEL_TITLE_MM),
                Point2::new(PAGE_WIDTH_MM - MARGIN_MM, y0 + slot),
            )
        })
        .collect()
}

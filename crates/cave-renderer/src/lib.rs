//! Cave Sketch 渲染器
//!
//! 把节点表绘制成带比例尺和指北针的测绘图，并排版到页面上。
//!
//! # 特点
//!
//! - **画布无关**：只通过 [`Canvas`] 的五个原语输出
//! - **尺度归一化**：标记、文字和线宽随图幅自动缩放
//! - **写时复制**：旋转不修改调用方的节点表

pub mod camera;
pub mod canvas;
pub mod compose;
pub mod north;
pub mod plot;
pub mod rule;

pub use camera::Camera2D;
pub use canvas::{Canvas, DisplayList, DrawCommand, Stroke, TextStyle};
pub use compose::{compose, Page, Panel, PanelKind};
pub use plot::{Exclusions, PlotLayout, PlotView, RenderScale, SurveyRenderer};
pub use rule::RuleOrientation;

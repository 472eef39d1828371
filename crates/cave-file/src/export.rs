//! 导出模块
//!
//! - 排版好的页面 → SVG（A4，每个子图一个 `<g>`，y 轴翻转）
//! - 地图 → 独立的 Leaflet HTML 文档

use crate::error::FileResult;
use cave_core::geo::GeoMap;
use cave_core::math::Point2;
use cave_core::properties::Color;
use cave_renderer::camera::Camera2D;
use cave_renderer::canvas::{DrawCommand, HAlign, Stroke, TextStyle, VAlign};
use cave_renderer::compose::{Page, Panel};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// 1pt 对应的毫米数
pub const PT_TO_MM: f64 = 25.4 / 72.0;

const PAGE_TITLE_SIZE_MM: f64 = 7.0;
const PANEL_TITLE_SIZE_MM: f64 = 4.5;

/// SVG 导出器
#[derive(Debug, Clone)]
pub struct SvgExporter {
    /// 子图内容四周的留白，占内容最大跨度的比例
    pub padding_ratio: f64,
}

impl Default for SvgExporter {
    fn default() -> Self {
        Self { padding_ratio: 0.03 }
    }
}

impl SvgExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 导出页面为 SVG 字符串
    pub fn export(&self, page: &Page) -> String {
        let mut svg = String::new();

        // SVG 头部
        let _ = write!(
            svg,
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}mm" height="{h}mm" viewBox="0 0 {w} {h}">
  <rect x="0" y="0" width="{w}" height="{h}" fill="white"/>
  <text x="{tx:.3}" y="{ty:.3}" font-family="sans-serif" font-size="{ts}" text-anchor="middle" dominant-baseline="middle">{title}</text>
"#,
            w = page.width_mm,
            h = page.height_mm,
            tx = page.title_anchor.x,
            ty = page.title_anchor.y,
            ts = PAGE_TITLE_SIZE_MM,
            title = escape(&page.title),
        );

        for panel in &page.panels {
            self.export_panel(&mut svg, panel);
        }

        // SVG 尾部
        svg.push_str("</svg>\n");
        svg
    }

    fn export_panel(&self, svg: &mut String, panel: &Panel) {
        let _ = writeln!(
            svg,
            r#"  <g class="panel" id="{id}">
    <text x="{x:.3}" y="{y:.3}" font-family="sans-serif" font-size="{size}" text-anchor="middle" dominant-baseline="middle">{title}</text>"#,
            id = panel.kind.title().to_lowercase(),
            x = panel.title_anchor.x,
            y = panel.title_anchor.y,
            size = PANEL_TITLE_SIZE_MM,
            title = escape(&panel.title),
        );

        let extent = panel.world_extent();
        if !extent.is_empty() {
            let mut camera = Camera2D::new(panel.frame);
            camera.zoom_to_fit(&extent, extent.max_span() * self.padding_ratio);
            for command in panel.drawing.commands() {
                let element = command_to_svg(&camera, command);
                let _ = writeln!(svg, "    {element}");
            }
        }

        svg.push_str("  </g>\n");
    }

    /// 导出到文件
    pub fn export_to_file(&self, page: &Page, path: &Path) -> FileResult<()> {
        std::fs::write(path, self.export(page))?;
        info!(path = %path.display(), panels = page.panels.len(), "survey page written");
        Ok(())
    }
}

/// 将绘图指令转换为 SVG 元素
fn command_to_svg(camera: &Camera2D, command: &DrawCommand) -> String {
    match command {
        DrawCommand::Point { at, area, color } => {
            let p = camera.world_to_screen(*at);
            let r = area.max(0.0).sqrt() / 2.0 * PT_TO_MM;
            format!(
                r#"<circle cx="{:.3}" cy="{:.3}" r="{:.3}" {} stroke="none"/>"#,
                p.x,
                p.y,
                r,
                fill_attrs(color)
            )
        }
        DrawCommand::Segment { from, to, stroke } => {
            let a = camera.world_to_screen(*from);
            let b = camera.world_to_screen(*to);
            format!(
                r#"<line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" {} stroke-linecap="round"/>"#,
                a.x,
                a.y,
                b.x,
                b.y,
                stroke_attrs(stroke)
            )
        }
        DrawCommand::Polygon {
            points,
            fill,
            outline,
        } => {
            let points = points
                .iter()
                .map(|p| {
                    let s = camera.world_to_screen(*p);
                    format!("{:.3},{:.3}", s.x, s.y)
                })
                .collect::<Vec<_>>()
                .join(" ");
            let outline = outline
                .as_ref()
                .map(stroke_attrs)
                .unwrap_or_else(|| r#"stroke="none""#.to_string());
            format!(r#"<polygon points="{points}" {} {outline}/>"#, fill_attrs(fill))
        }
        DrawCommand::Circle {
            center,
            radius,
            stroke,
        } => {
            let c = camera.world_to_screen(*center);
            format!(
                r#"<circle cx="{:.3}" cy="{:.3}" r="{:.3}" fill="none" {}/>"#,
                c.x,
                c.y,
                camera.scale_length(*radius),
                stroke_attrs(stroke)
            )
        }
        DrawCommand::Text { at, text, style } => text_to_svg(camera.world_to_screen(*at), text, style),
    }
}

fn text_to_svg(at: Point2, text: &str, style: &TextStyle) -> String {
    let anchor = match style.h_align {
        HAlign::Left => "start",
        HAlign::Center => "middle",
        HAlign::Right => "end",
    };
    let baseline = match style.v_align {
        VAlign::Top => "hanging",
        VAlign::Center => "middle",
        VAlign::Bottom => "auto",
    };
    // 页面 y 向下，逆时针角度取负
    let rotate = if style.rotation_deg != 0.0 {
        format!(
            r#" transform="rotate({:.3} {:.3} {:.3})""#,
            -style.rotation_deg, at.x, at.y
        )
    } else {
        String::new()
    };
    format!(
        r#"<text x="{:.3}" y="{:.3}" font-family="sans-serif" font-size="{:.3}" {} text-anchor="{anchor}" dominant-baseline="{baseline}"{rotate}>{}</text>"#,
        at.x,
        at.y,
        style.size * PT_TO_MM,
        fill_attrs(&style.color),
        escape(text)
    )
}

fn fill_attrs(color: &Color) -> String {
    if color.a == 255 {
        format!(r#"fill="{}""#, color.to_hex())
    } else {
        format!(r#"fill="{}" fill-opacity="{:.3}""#, color.to_hex(), color.opacity())
    }
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let mut attrs = format!(
        r#"stroke="{}" stroke-width="{:.3}""#,
        stroke.color.to_hex(),
        stroke.width * PT_TO_MM
    );
    if stroke.color.a != 255 {
        let _ = write!(attrs, r#" stroke-opacity="{:.3}""#, stroke.color.opacity());
    }
    if !stroke.dash.is_empty() {
        let dash = stroke
            .dash
            .iter()
            .map(|d| format!("{:.3}", d * PT_TO_MM))
            .collect::<Vec<_>>()
            .join(",");
        let _ = write!(attrs, r#" stroke-dasharray="{dash}""#);
    }
    attrs
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const LEAFLET_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
  <title>__TITLE__</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
  <div id="map"></div>
  <script>
    const data = __MAP_DATA__;
    const map = L.map("map").setView(data.center, data.zoom_start);
    const osm = L.tileLayer("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", {
      attribution: "&copy; OpenStreetMap contributors",
      maxZoom: 19
    }).addTo(map);
    const satellite = L.tileLayer("https://mt1.google.com/vt/lyrs=s&x={x}&y={y}&z={z}", {
      attribution: "Google",
      maxZoom: 21
    });
    const survey = L.layerGroup(
      data.polylines.map(p => L.polyline(p.points, { color: p.color, weight: p.weight, opacity: p.opacity }))
    ).addTo(map);
    L.control.layers({ "OpenStreetMap": osm, "Google Satellite": satellite }, { "Survey": survey }).addTo(map);
    L.control.scale().addTo(map);
  </script>
</body>
</html>
"#;

/// Leaflet 地图导出器
#[derive(Debug, Clone, Default)]
pub struct MapExporter;

impl MapExporter {
    /// 导出为独立的 HTML 文档
    pub fn export(&self, title: &str, map: &GeoMap) -> FileResult<String> {
        // 防止数据中的 `</script>` 提前结束脚本
        let data = serde_json::to_string(map)?.replace("</", "<\\/");
        Ok(LEAFLET_TEMPLATE
            .replace("__TITLE__", &escape(title))
            .replace("__MAP_DATA__", &data))
    }

    /// 导出到文件
    pub fn export_to_file(&self, title: &str, map: &GeoMap, path: &Path) -> FileResult<()> {
        std::fs::write(path, self.export(title, map)?)?;
        info!(path = %path.display(), polylines = map.polylines.len(), "map written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cave_core::config::DrawingConfig;
    use cave_core::geo::{project, ReferencePoint};
    use cave_core::node::{Node, NodeTable, NodeType};
    use cave_core::style::StyleTable;
    use cave_renderer::compose::compose;
    use cave_renderer::plot::Exclusions;

    fn table() -> NodeTable {
        NodeTable::from_nodes([
            Node::new("0", Point2::new(0.0, 0.0), NodeType::Station).with_links(["1".into()]),
            Node::new("1", Point2::new(40.0, 10.0), NodeType::Station).with_links(["0".into()]),
            Node::new("0P0", Point2::new(0.0, 5.0), NodeType::Chimney).with_links(["0P1".into()]),
            Node::new("0P1", Point2::new(40.0, 15.0), NodeType::Chimney).with_links(["0P0".into()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_svg_page_structure() {
        let t = table();
        let page = compose(
            "Grotta <Nuova>",
            Some(&t),
            Some(&t),
            &DrawingConfig::default(),
            &Exclusions::new(),
            &StyleTable::default(),
        )
        .unwrap();
        let svg = SvgExporter::new().export(&page);

        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(r#"width="210mm" height="297mm""#));
        assert!(svg.contains("Grotta &lt;Nuova&gt;"));
        assert_eq!(svg.matches(r#"<g class="panel""#).count(), 2);
        assert!(svg.contains(r#"id="sezione""#) && svg.contains(r#"id="pianta""#));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("100 m"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_svg_stays_inside_panel_frames() {
        let t = table();
        let page = compose(
            "T",
            Some(&t),
            None,
            &DrawingConfig::default(),
            &Exclusions::new(),
            &StyleTable::default(),
        )
        .unwrap();
        let panel = &page.panels[0];
        let mut camera = Camera2D::new(panel.frame);
        let extent = panel.world_extent();
        camera.zoom_to_fit(&extent, 0.0);

        let low = camera.world_to_screen(extent.min);
        let high = camera.world_to_screen(extent.max);
        let frame = panel.frame.inflate(1e-6);
        assert!(frame.contains(&low) && frame.contains(&high));
        // y 轴翻转
        assert!(high.y < low.y);
    }

    #[test]
    fn test_text_alignment_and_rotation() {
        let style = TextStyle::new(10.0, Color::BLACK, HAlign::Center, VAlign::Top).rotated(90.0);
        let svg = text_to_svg(Point2::new(5.0, 6.0), "a&b", &style);
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"dominant-baseline="hanging""#));
        assert!(svg.contains("rotate(-90.000 5.000 6.000)"));
        assert!(svg.contains(">a&amp;b<"));
    }

    #[test]
    fn test_leaflet_document() {
        let geo = project(&table(), &[ReferencePoint::new("0", 46.0, 11.0)]).unwrap();
        let map = GeoMap::from_table(&geo, &StyleTable::default());
        let html = MapExporter.export("Buco </script>", &map).unwrap();

        assert!(html.contains("leaflet.js"));
        assert!(html.contains("lyrs=s"));
        assert!(html.contains("L.control.layers"));
        assert!(html.contains("L.control.scale()"));
        assert!(html.contains("\"zoom_start\":15"));
        assert!(!html.contains("Buco </script>"));
        assert_eq!(html.matches("\"weight\":").count(), map.polylines.len());
    }
}

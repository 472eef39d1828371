//! 绘图属性定义
//!
//! 包含颜色、线型（虚线模式）和线宽档位。

use serde::{Deserialize, Serialize};

/// RGBA颜色
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// 不透明度，范围 [0.0, 1.0]
    pub fn opacity(&self) -> f64 {
        self.a as f64 / 255.0
    }

    /// 替换透明度
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self {
            a: (opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// CSS 十六进制表示（不含透明度）
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 128, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const INDIGO: Color = Color::new(75, 0, 130);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const GRAY: Color = Color::new(128, 128, 128);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// 线型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LineType {
    /// 连续线（实线）
    Continuous,
    /// 点线：画 `on` 个线宽单位，空 `off` 个线宽单位
    Dotted { on: f64, off: f64 },
}

impl LineType {
    /// 获取线型的模式数据
    pub fn pattern(&self) -> Vec<f64> {
        match self {
            LineType::Continuous => vec![],
            LineType::Dotted { on, off } => vec![*on, -*off],
        }
    }

    /// 按线宽缩放后的虚线数组（绝对值），实线返回空
    pub fn dash_array(&self, line_width: f64) -> Vec<f64> {
        self.pattern().iter().map(|x| x.abs() * line_width).collect()
    }
}

impl Default for LineType {
    fn default() -> Self {
        LineType::Continuous
    }
}

/// 线宽档位
///
/// 细线用于测站骨架等辅助线，粗线用于洞穴形态线。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidthTier {
    Thin,
    Thick,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::new(75, 0, 130), Color::INDIGO);
        assert_eq!(Color::INDIGO.to_hex(), "#4b0082");
    }

    #[test]
    fn test_color_opacity() {
        let water = Color::BLUE.with_opacity(0.3);
        assert_eq!(water.a, 77);
        assert!((water.opacity() - 0.3).abs() < 0.01);
    }

    #[test]
    fn test_dash_array_scales_with_width() {
        let dotted = LineType::Dotted { on: 1.0, off: 2.0 };
        assert_eq!(dotted.dash_array(0.5), vec![0.5, 1.0]);
        assert!(LineType::Continuous.dash_array(3.0).is_empty());
        assert_eq!(dotted.pattern(), vec![1.0, -2.0]);
    }
}

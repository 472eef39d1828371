//! 绘图配置
//!
//! 每次渲染调用创建一份，用完即弃。

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// 比例尺默认分段数
pub const RULE_SEGMENTS: u32 = 5;

/// 测绘图绘制配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingConfig {
    /// 是否绘制测站标记与编号
    #[serde(default = "DrawingConfig::default_show_markers")]
    pub show_markers: bool,
    /// 标记大小缩放指数，范围 [-1, 1]
    #[serde(default)]
    pub marker_zoom: f64,
    /// 文字大小缩放指数，范围 [-1, 1]
    #[serde(default)]
    pub text_zoom: f64,
    /// 线宽缩放指数，范围 [-1, 1]
    #[serde(default)]
    pub line_width_zoom: f64,
    /// 平面图旋转角度，范围 [-180, 180]
    #[serde(default)]
    pub rotation_deg: i32,
    /// 比例尺总长（米）
    #[serde(default = "DrawingConfig::default_rule_length")]
    pub rule_length_m: f64,
}

impl DrawingConfig {
    fn default_show_markers() -> bool {
        true
    }

    fn default_rule_length() -> f64 {
        100.0
    }

    /// 校验取值范围，在任何绘制之前调用
    pub fn validate(&self) -> CoreResult<()> {
        for (name, value) in [
            ("marker_zoom", self.marker_zoom),
            ("text_zoom", self.text_zoom),
            ("line_width_zoom", self.line_width_zoom),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(CoreError::Configuration(format!(
                    "{name} must be within [-1, 1], got {value}"
                )));
            }
        }
        if !(-180..=180).contains(&self.rotation_deg) {
            return Err(CoreError::Configuration(format!(
                "rotation_deg must be within [-180, 180], got {}",
                self.rotation_deg
            )));
        }
        self.rule_segment_length().map(|_| ())
    }

    /// 比例尺单段长度；总长必须能被分段数整除为整数米
    pub fn rule_segment_length(&self) -> CoreResult<f64> {
        let length = self.rule_length_m;
        if !length.is_finite() || length <= 0.0 {
            return Err(CoreError::Configuration(format!(
                "rule length must be positive, got {length}"
            )));
        }
        let segment = length / RULE_SEGMENTS as f64;
        if (segment - segment.round()).abs() > 1e-9 {
            return Err(CoreError::Configuration(format!(
                "rule length {length} is not divisible into {RULE_SEGMENTS} whole segments"
            )));
        }
        Ok(segment)
    }
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            show_markers: Self::default_show_markers(),
            marker_zoom: 0.0,
            text_zoom: 0.0,
            line_width_zoom: 0.0,
            rotation_deg: 0,
            rule_length_m: Self::default_rule_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = DrawingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rule_segment_length().unwrap(), 20.0);
    }

    #[test]
    fn test_zoom_out_of_range() {
        let config = DrawingConfig {
            text_zoom: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_rotation_out_of_range() {
        let config = DrawingConfig {
            rotation_deg: -190,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rule_length_must_split_evenly() {
        let odd = DrawingConfig {
            rule_length_m: 12.0,
            ..Default::default()
        };
        assert!(matches!(odd.validate(), Err(CoreError::Configuration(_))));

        let zero = DrawingConfig {
            rule_length_m: 0.0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let fifty = DrawingConfig {
            rule_length_m: 50.0,
            ..Default::default()
        };
        assert_eq!(fifty.rule_segment_length().unwrap(), 10.0);
    }
}

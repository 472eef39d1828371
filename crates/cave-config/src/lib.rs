//! Cave Sketch 任务配置
//!
//! 从 TOML 任务文件读取输入图纸、输出位置、绘图参数、图层约定和参考点。
//! 未写出的字段取默认值，相对路径以任务文件所在目录为基准。

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use cave_core::config::DrawingConfig;
use cave_core::geo::ReferencePoint;
use cave_core::graph::BuildOptions;
use cave_core::node::NodeId;
use cave_core::CoreError;
use cave_file::LayerConventions;
use serde::Deserialize;
use thiserror::Error;

/// 任务配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub survey: SurveyConfig,
    #[serde(default)]
    pub drawing: DrawingConfig,
    #[serde(default)]
    pub layers: LayerConventions,
    #[serde(default)]
    pub reference_points: Vec<ReferencePoint>,
}

impl JobConfig {
    /// 从显式路径加载配置；相对路径以配置文件所在目录为基准。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate().map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            config.survey.resolve_paths(base);
        }
        Ok(config)
    }

    /// 绘图参数与输入文件的一致性检查。
    pub fn validate(&self) -> Result<(), CoreError> {
        self.drawing.validate()?;
        if self.survey.plan_dxf.is_none() && self.survey.section_dxf.is_none() {
            return Err(CoreError::NoInput);
        }
        if self.survey.resample_step == Some(0) {
            return Err(CoreError::Configuration("resample_step must be at least 1".into()));
        }
        Ok(())
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            reference_station: self.survey.reference_station.clone(),
            resample_step: self.survey.resample_step,
            ..BuildOptions::default()
        }
    }

    /// 不参与绘制的节点。
    pub fn exclusions(&self) -> HashSet<NodeId> {
        self.survey
            .excluded_nodes
            .iter()
            .map(|id| NodeId::new(id.trim()))
            .collect()
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 测绘任务：输入图纸、输出位置和建图选项。
#[derive(Debug, Clone, Deserialize)]
pub struct SurveyConfig {
    #[serde(default = "SurveyConfig::default_title")]
    pub title: String,
    #[serde(default)]
    pub plan_dxf: Option<PathBuf>,
    #[serde(default)]
    pub section_dxf: Option<PathBuf>,
    #[serde(default = "SurveyConfig::default_output_dir")]
    pub output_dir: PathBuf,
    /// 输出文件名前缀
    #[serde(default = "SurveyConfig::default_output_name")]
    pub output_name: String,
    #[serde(default)]
    pub excluded_nodes: Vec<String>,
    #[serde(default = "SurveyConfig::default_reference_station")]
    pub reference_station: String,
    #[serde(default)]
    pub resample_step: Option<usize>,
}

impl SurveyConfig {
    fn default_title() -> String {
        "Rilievo".to_string()
    }

    fn default_output_dir() -> PathBuf {
        PathBuf::from(".")
    }

    fn default_output_name() -> String {
        "survey".to_string()
    }

    fn default_reference_station() -> String {
        "0".to_string()
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        if let Some(path) = self.plan_dxf.as_mut() {
            resolve(path);
        }
        if let Some(path) = self.section_dxf.as_mut() {
            resolve(path);
        }
        resolve(&mut self.output_dir);
    }

    fn output(&self, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("{}{suffix}", self.output_name))
    }

    pub fn plan_table_path(&self) -> PathBuf {
        self.output("_plan.csv")
    }

    pub fn section_table_path(&self) -> PathBuf {
        self.output("_section.csv")
    }

    pub fn page_path(&self) -> PathBuf {
        self.output(".svg")
    }

    pub fn map_path(&self) -> PathBuf {
        self.output("_map.html")
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            plan_dxf: None,
            section_dxf: None,
            output_dir: Self::default_output_dir(),
            output_name: Self::default_output_name(),
            excluded_nodes: Vec::new(),
            reference_station: Self::default_reference_station(),
            resample_step: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("配置文件 {path:?} 无效: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: CoreError,
    },
}

//! # Matrix Expansion Module / 矩阵展开模块
//!
//! Expands the declared axes into independent job instances.
//! The cross product follows declaration order (the first axis is the
//! outermost loop); `exclude` entries are removed, then `include` entries
//! are appended unless already present.
//!
//! 将声明的轴展开为独立的作业实例。
//! 笛卡尔积遵循声明顺序（第一个轴为最外层循环）；
//! 先移除 `exclude` 条目，再追加尚未存在的 `include` 条目。

use serde::ser::{Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::core::config::{AxisSpec, MatrixSpec};
use crate::core::error::ConfigError;

/// The axis values of one combination, in axis declaration order.
/// 单个组合的轴取值，按轴声明顺序排列。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MatrixValues(Vec<(String, String)>);

impl MatrixValues {
    pub fn new(values: Vec<(String, String)>) -> Self {
        Self(values)
    }

    pub fn get(&self, axis: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == axis)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` if every key of `entry` is present with the same value.
    fn contains_all(&self, entry: &BTreeMap<String, String>) -> bool {
        entry
            .iter()
            .all(|(key, value)| self.get(key) == Some(value.as_str()))
    }
}

impl Serialize for MatrixValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

impl fmt::Display for MatrixValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<&str> = self.0.iter().map(|(_, v)| v.as_str()).collect();
        write!(f, "{}", values.join(", "))
    }
}

/// One concrete combination of axis values.
/// 轴取值的一个具体组合。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct JobInstance {
    /// Position in the expanded matrix.
    /// 在展开后矩阵中的位置。
    pub index: usize,
    /// Display name, e.g. `build (ubuntu-latest, rust-tls)`.
    /// 显示名称，例如 `build (ubuntu-latest, rust-tls)`。
    pub name: String,
    pub values: MatrixValues,
}

/// A validated matrix declaration.
/// 经过校验的矩阵声明。
#[derive(Debug, Clone)]
pub struct MatrixExpander {
    axes: Vec<AxisSpec>,
    include: Vec<BTreeMap<String, String>>,
    exclude: Vec<BTreeMap<String, String>>,
}

impl MatrixExpander {
    /// Validates the declaration: non-empty axes, unique axis names, unique
    /// values per axis, and include/exclude entries naming declared axes.
    pub fn new(spec: &MatrixSpec) -> Result<Self, ConfigError> {
        let mut seen_axes = HashSet::new();
        for axis in &spec.axes {
            if !seen_axes.insert(axis.name.as_str()) {
                return Err(ConfigError::DuplicateAxis(axis.name.clone()));
            }
            if axis.values.is_empty() {
                return Err(ConfigError::EmptyAxis(axis.name.clone()));
            }
            let mut seen_values = HashSet::new();
            for value in &axis.values {
                if !seen_values.insert(value.as_str()) {
                    return Err(ConfigError::DuplicateValue {
                        axis: axis.name.clone(),
                        value: value.clone(),
                    });
                }
            }
        }

        for (section, entries) in [("include", &spec.include), ("exclude", &spec.exclude)] {
            for entry in entries {
                if let Some(unknown) = entry.keys().find(|k| !seen_axes.contains(k.as_str())) {
                    return Err(ConfigError::UnknownAxis {
                        section,
                        axis: unknown.clone(),
                    });
                }
            }
        }

        Ok(Self {
            axes: spec.axes.clone(),
            include: spec.include.clone(),
            exclude: spec.exclude.clone(),
        })
    }

    pub fn axis_names(&self) -> Vec<&str> {
        self.axes.iter().map(|a| a.name.as_str()).collect()
    }

    /// All combinations after exclude/include, in deterministic order.
    pub fn combinations(&self) -> Vec<MatrixValues> {
        let mut combinations: Vec<Vec<(String, String)>> = vec![Vec::new()];

        for axis in &self.axes {
            combinations = combinations
                .into_iter()
                .flat_map(|combo| {
                    axis.values.iter().map(move |value| {
                        let mut next = combo.clone();
                        next.push((axis.name.clone(), value.clone()));
                        next
                    })
                })
                .collect();
        }

        let mut combinations: Vec<MatrixValues> = combinations
            .into_iter()
            .map(MatrixValues)
            .filter(|combo| !self.exclude.iter().any(|entry| combo.contains_all(entry)))
            .collect();

        for entry in &self.include {
            let extra = self.ordered(entry);
            if !combinations.contains(&extra) {
                combinations.push(extra);
            }
        }

        combinations
    }

    /// Expands into named job instances.
    /// 展开为具名的作业实例。
    pub fn expand(&self, job_name: &str) -> Vec<JobInstance> {
        self.combinations()
            .into_iter()
            .enumerate()
            .map(|(index, values)| {
                let name = if values.is_empty() {
                    job_name.to_string()
                } else {
                    format!("{} ({})", job_name, values)
                };
                JobInstance {
                    index,
                    name,
                    values,
                }
            })
            .collect()
    }

    fn ordered(&self, entry: &BTreeMap<String, String>) -> MatrixValues {
        MatrixValues(
            self.axes
                .iter()
                .filter_map(|axis| {
                    entry
                        .get(&axis.name)
                        .map(|value| (axis.name.clone(), value.clone()))
                })
                .collect(),
        )
    }
}

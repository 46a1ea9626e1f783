//! Extension definitions and the package manifest that lists them

use crate::error::{BuildError, BuildResult};
use crate::toolchain::ToolchainFlags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One shared artifact built from one or more GPU-kernel sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    /// Dotted name, e.g. `cudamat.libcudamat`
    pub name: String,
    pub sources: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_dirs: Vec<PathBuf>,
    /// `(name, value)` pairs; a `None` value defines the macro without a value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub define_macros: Vec<(String, Option<String>)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub undef_macros: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub library_dirs: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_compile_args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_link_args: Vec<String>,
}

impl Extension {
    pub fn new<P: Into<PathBuf>>(name: impl Into<String>, sources: impl IntoIterator<Item = P>) -> Self {
        Self {
            name: name.into(),
            sources: sources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_libraries(mut self, libraries: &[&str]) -> Self {
        self.libraries = libraries.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dirs.push(dir.into());
        self
    }

    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dirs.push(dir.into());
        self
    }

    pub fn define(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.define_macros.push((name.into(), value.map(str::to_string)));
        self
    }

    pub fn undefine(mut self, name: impl Into<String>) -> Self {
        self.undef_macros.push(name.into());
        self
    }

    /// Forward the toolchain flags to both the compile and the link step
    pub fn with_toolchain_flags(mut self, flags: &ToolchainFlags) -> Self {
        self.extra_compile_args.extend(flags.iter().cloned());
        self.extra_link_args.extend(flags.iter().cloned());
        self
    }

    pub fn validate(&self) -> BuildResult<()> {
        let invalid = |reason: &str| BuildError::InvalidExtension {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() || self.name.split('.').any(str::is_empty) {
            return Err(invalid("name must be a non-empty dotted identifier"));
        }
        if self.sources.is_empty() {
            return Err(invalid("no source files"));
        }

        Ok(())
    }

    /// Artifact path relative to the build directory: `pkg.libname` becomes
    /// `pkg/libname<shared_ext>`
    pub fn artifact_path(&self, shared_ext: &str) -> PathBuf {
        let mut parts: Vec<&str> = self.name.split('.').collect();
        let file = parts.pop().unwrap_or_default();
        let mut path: PathBuf = parts.into_iter().collect();
        path.push(format!("{}{}", file, shared_ext));
        path
    }
}

/// Package description consumed by the CLI
///
/// Metadata fields are reported but never influence the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Data files shipped next to each package
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub package_data: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub extensions: Vec<Extension>,
}

impl PackageManifest {
    pub fn from_json(content: &str) -> BuildResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> BuildResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> BuildResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Extensions with the toolchain flags applied
    pub fn extensions_with_flags(&self, flags: &ToolchainFlags) -> Vec<Extension> {
        self.extensions
            .iter()
            .cloned()
            .map(|ext| ext.with_toolchain_flags(flags))
            .collect()
    }
}

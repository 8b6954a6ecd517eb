// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream configuration.
//!
//! With the `config-loaders` feature (default), a configuration can be read
//! from YAML. Missing keys keep their defaults, unknown keys are rejected.
//!
//! ```yaml
//! # stream.yaml
//! indent: 4
//! xml_declaration: false
//! verify: def_value
//! max_depth: 256
//! element_tag: entry
//! ```

#[cfg(feature = "config-loaders")]
use crate::error::{Error, Result};
#[cfg(feature = "config-loaders")]
use serde::Deserialize;
#[cfg(feature = "config-loaders")]
use std::path::Path;

/// Default XML indentation (spaces per level).
pub const DEFAULT_INDENT: usize = 2;

/// Default nesting limit for readers.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Default tag for container elements whose type has no usable name.
pub const DEFAULT_ELEMENT_TAG: &str = "item";

/// What the writer does with a required class member that is not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config-loaders", derive(Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(rename_all = "snake_case"))]
pub enum VerifyData {
    /// Fail with [`MemberNotSet`](crate::Error::MemberNotSet).
    #[default]
    Yes,
    /// Omit the member.
    No,
    /// Write the zero value of the member's type.
    DefValue,
}

/// Writer and reader settings shared by every format.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(Deserialize))]
#[cfg_attr(feature = "config-loaders", serde(default, deny_unknown_fields))]
pub struct StreamConfig {
    /// Spaces per nesting level in XML output (0 = compact, no newlines).
    pub indent: usize,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first.
    pub xml_declaration: bool,
    /// Handling of unset required members.
    pub verify: VerifyData,
    /// Maximum nesting accepted by readers.
    pub max_depth: usize,
    /// Tag used for container elements of anonymous types.
    pub element_tag: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            xml_declaration: true,
            verify: VerifyData::Yes,
            max_depth: DEFAULT_MAX_DEPTH,
            element_tag: DEFAULT_ELEMENT_TAG.to_string(),
        }
    }
}

impl StreamConfig {
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_xml_declaration(mut self, enabled: bool) -> Self {
        self.xml_declaration = enabled;
        self
    }

    pub fn with_verify(mut self, verify: VerifyData) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_element_tag(mut self, tag: impl Into<String>) -> Self {
        self.element_tag = tag.into();
        self
    }

    /// Compact output: no declaration, no indentation.
    pub fn compact() -> Self {
        Self::default().with_indent(0).with_xml_declaration(false)
    }
}

#[cfg(feature = "config-loaders")]
impl StreamConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Config(format!("Failed to parse YAML: {}", e)))
    }

    /// Load a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("[StreamConfig] loading {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read YAML file: {}", e)))?;
        Self::from_yaml_str(&content)
    }
}

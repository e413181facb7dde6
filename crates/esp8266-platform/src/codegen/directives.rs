//! Collected build directives and their textual renderings.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::codegen::expr::Expression;
use crate::context::SdkconfigValue;
use crate::error::{PlatformError, Result};

/// Value of a build option in the generated `platformio.ini`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BuildOption {
    Scalar(String),
    List(Vec<String>),
}

/// A preprocessor define, with or without a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Define {
    pub name: String,
    pub value: Option<Expression>,
}

/// Everything the platform asks the build orchestrator to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Directives {
    options: BTreeMap<String, BuildOption>,
    build_flags: Vec<String>,
    defines: Vec<Define>,
    statements: Vec<Expression>,
    globals: Vec<Expression>,
}

impl Directives {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar build option, replacing any previous scalar value.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        if let Some(BuildOption::List(_)) = self.options.get(&key) {
            return Err(PlatformError::OptionKindMismatch { key });
        }
        self.options.insert(key, BuildOption::Scalar(value.into()));
        Ok(())
    }

    /// Append items to a list-valued build option.
    pub fn extend_option<I, S>(&mut self, key: impl Into<String>, items: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        match self
            .options
            .entry(key.clone())
            .or_insert_with(|| BuildOption::List(Vec::new()))
        {
            BuildOption::List(list) => {
                list.extend(items.into_iter().map(Into::into));
                Ok(())
            }
            BuildOption::Scalar(_) => Err(PlatformError::OptionKindMismatch { key }),
        }
    }

    /// Add a compiler flag. Repeated flags are kept once.
    pub fn add_build_flag(&mut self, flag: impl Into<String>) {
        let flag = flag.into();
        if !self.build_flags.contains(&flag) {
            self.build_flags.push(flag);
        }
    }

    /// Add a value-less define.
    pub fn add_define(&mut self, name: impl Into<String>) {
        self.put_define(name.into(), None);
    }

    pub fn add_define_value(&mut self, name: impl Into<String>, value: Expression) {
        self.put_define(name.into(), Some(value));
    }

    /// Add a statement to the generated setup code.
    pub fn add_statement(&mut self, statement: Expression) {
        self.statements.push(statement);
    }

    /// Add a declaration at global scope.
    pub fn add_global(&mut self, global: Expression) {
        self.globals.push(global);
    }

    pub fn option(&self, key: &str) -> Option<&BuildOption> {
        self.options.get(key)
    }

    pub fn options(&self) -> &BTreeMap<String, BuildOption> {
        &self.options
    }

    pub fn build_flags(&self) -> &[String] {
        &self.build_flags
    }

    pub fn defines(&self) -> &[Define] {
        &self.defines
    }

    pub fn define(&self, name: &str) -> Option<&Define> {
        self.defines.iter().find(|d| d.name == name)
    }

    pub fn statements(&self) -> &[Expression] {
        &self.statements
    }

    pub fn globals(&self) -> &[Expression] {
        &self.globals
    }

    /// Render the `[env]` section of `platformio.ini`.
    pub fn render_platformio_ini(&self) -> String {
        let mut out = String::from("[env]\n");
        for (key, value) in &self.options {
            match value {
                BuildOption::Scalar(v) => {
                    let _ = writeln!(out, "{key} = {v}");
                }
                BuildOption::List(items) => write_list(&mut out, key, items),
            }
        }
        if !self.build_flags.is_empty() {
            write_list(&mut out, "build_flags", &self.build_flags);
        }
        out
    }

    /// Render the generated defines header.
    pub fn render_defines_header(&self) -> String {
        let mut out = String::from("#pragma once\n");
        for define in &self.defines {
            match &define.value {
                Some(value) => {
                    let _ = writeln!(out, "#define {} {value}", define.name);
                }
                None => {
                    let _ = writeln!(out, "#define {}", define.name);
                }
            }
        }
        out
    }

    /// Render global declarations followed by the setup statements.
    pub fn render_cpp(&self) -> String {
        let mut out = String::new();
        for global in &self.globals {
            let _ = writeln!(out, "{global};");
        }
        if !self.globals.is_empty() {
            out.push('\n');
        }
        out.push_str("void setup() {\n");
        for statement in &self.statements {
            let _ = writeln!(out, "  {statement};");
        }
        out.push_str("}\n");
        out
    }

    fn put_define(&mut self, name: String, value: Option<Expression>) {
        match self.defines.iter_mut().find(|d| d.name == name) {
            Some(existing) => existing.value = value,
            None => self.defines.push(Define { name, value }),
        }
    }
}

fn write_list(out: &mut String, key: &str, items: &[String]) {
    let _ = writeln!(out, "{key} =");
    for item in items {
        let _ = writeln!(out, "    {item}");
    }
}

/// Render `sdkconfig.defaults` content, one `NAME=value` line per entry.
pub fn render_sdkconfig(options: &BTreeMap<String, SdkconfigValue>) -> String {
    let mut out = String::new();
    for (name, value) in options {
        let _ = writeln!(out, "{name}={value}");
    }
    out
}

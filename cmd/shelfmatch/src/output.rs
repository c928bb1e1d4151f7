//! Result output for scripting.

use std::fs::File;
use std::io::Write;

use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Where and how a command writes its result.
pub struct Output {
    pub format: OutputFormat,
    pub file: Option<String>,
}

impl Output {
    pub fn new(json: bool, file: Option<&str>) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Yaml
            },
            file: file.map(str::to_string),
        }
    }

    pub fn render<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        Ok(match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
        })
    }

    pub fn write<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let rendered = self.render(value)?;
        match &self.file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(rendered.as_bytes())?;
            }
            None => println!("{}", rendered),
        }
        Ok(())
    }
}

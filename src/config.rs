use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MonochromeError;
use crate::imops::*;
use crate::params::MonochromeParams;

#[derive(Serialize, Deserialize, Debug)]
pub struct RawConfig {
    #[serde(default)]
    pub pipeline_modules: Vec<toml::Table>,
}

pub struct PipelineConfig {
    pub pipeline_modules: Vec<Box<dyn PipelineModule>>,
}

impl PipelineConfig {
    /// A pipeline holding one enabled monochrome stage.
    pub fn single(params: MonochromeParams) -> Self {
        PipelineConfig {
            pipeline_modules: vec![Box::new(Module::new("Monochrome", true, params))],
        }
    }
}

pub fn parse_config(source: &str) -> Result<PipelineConfig, MonochromeError> {
    let data: RawConfig = toml::from_str(source)?;

    let mut config = PipelineConfig {
        pipeline_modules: Vec::with_capacity(data.pipeline_modules.len()),
    };

    for module in data.pipeline_modules {
        let name = module
            .get("name")
            .and_then(toml::Value::as_str)
            .ok_or(MonochromeError::MissingModuleName)?
            .to_string();
        let pipeline_module: Box<dyn PipelineModule> = match name.as_str() {
            "Monochrome" => {
                let module = Module::<MonochromeParams>::from_toml(module)?;
                if let Err(err) = module.config.validate() {
                    warn!("{:} rejected: {err}", module.name);
                    return Err(err);
                }
                module
            }
            _ => {
                warn!("wrong pipeline module name {:}", name);
                return Err(MonochromeError::UnknownModule(name));
            }
        };

        config.pipeline_modules.push(pipeline_module);
    }
    Ok(config)
}

pub fn load_config(config_path: impl AsRef<Path>) -> Result<PipelineConfig, MonochromeError> {
    let data_string = std::fs::read_to_string(config_path)?;
    parse_config(&data_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_monochrome_modules() {
        let config = parse_config(
            r#"
            [[pipeline_modules]]
            name = "Monochrome"
            enabled = true
            operator = 1
            colorcontrast = 2.0

            [[pipeline_modules]]
            name = "Monochrome"
            operator = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline_modules.len(), 2);
        assert!(config.pipeline_modules[0].is_enabled());
        assert!(!config.pipeline_modules[1].is_enabled());
        assert_eq!(config.pipeline_modules[1].get_name(), "Monochrome");
    }

    #[test]
    fn out_of_range_colorcontrast_is_an_error() {
        let result = parse_config(
            r#"
            [[pipeline_modules]]
            name = "Monochrome"
            colorcontrast = 9.0
            "#,
        );
        assert!(matches!(result, Err(MonochromeError::ColorContrastRange(v)) if v == 9.0));
    }

    #[test]
    fn empty_config_has_no_modules() {
        let config = parse_config("").unwrap();
        assert!(config.pipeline_modules.is_empty());
    }

    #[test]
    fn unknown_module_is_an_error() {
        let result = parse_config(
            r#"
            [[pipeline_modules]]
            name = "Sepia"
            "#,
        );
        assert!(matches!(result, Err(MonochromeError::UnknownModule(name)) if name == "Sepia"));
    }

    #[test]
    fn module_without_name_is_an_error() {
        let result = parse_config(
            r#"
            [[pipeline_modules]]
            operator = 1
            "#,
        );
        assert!(matches!(result, Err(MonochromeError::MissingModuleName)));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            parse_config("[[pipeline_modules]\nname ="),
            Err(MonochromeError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(
            load_config("/nonexistent/monochrome.toml"),
            Err(MonochromeError::Io(_))
        ));
    }
}

use serde::Deserialize;

use crate::error::MonochromeError;
use crate::local_laplacian::LocalLaplacian;
use crate::monochrome;
use crate::params::{default_enabled, MonochromeParams, Operator};
use crate::pixels::LabImage;

pub trait PipelineModule {
    fn process(&self, image: &LabImage) -> Result<LabImage, MonochromeError>;
    fn get_name(&self) -> String;
    fn is_enabled(&self) -> bool;
}

/// A configured pipeline stage: the module parameters plus the keys every
/// module shares.
#[derive(Debug, Clone, PartialEq)]
pub struct Module<T> {
    pub name: String,
    pub enabled: bool,
    pub config: T,
}

impl<T> Module<T> {
    pub fn new(name: &str, enabled: bool, config: T) -> Self {
        Module {
            name: name.to_string(),
            enabled,
            config,
        }
    }

    pub fn from_toml(module: toml::Table) -> Result<Box<Self>, MonochromeError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let name = module
            .get("name")
            .and_then(toml::Value::as_str)
            .ok_or(MonochromeError::MissingModuleName)?
            .to_string();
        let enabled = module
            .get("enabled")
            .and_then(toml::Value::as_bool)
            .unwrap_or_else(default_enabled);
        let config: T = toml::Value::Table(module).try_into()?;
        Ok(Box::new(Module {
            name,
            enabled,
            config,
        }))
    }
}

impl PipelineModule for Module<MonochromeParams> {
    fn process(&self, image: &LabImage) -> Result<LabImage, MonochromeError> {
        let operator = Operator::try_from(&self.config)?;
        let mut result = image.clone();
        monochrome::process(
            &operator,
            &LocalLaplacian::default(),
            &image.data,
            &mut result.data,
            &image.region(),
        )?;
        Ok(result)
    }

    fn get_name(&self) -> String {
        self.name.clone()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

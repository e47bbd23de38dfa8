pub mod grid_loader;
pub mod project_ways;

use log::{error, info};

use crate::errors::Result;

/// A three phase job. `process` runs the phases in order, logs each one and
/// stops at the first failure.
pub trait Etl {
    type Input;
    type Output;
    type Loaded;

    fn etl_name(&self) -> &str;

    fn extract(&mut self) -> Result<Self::Input>;
    fn transform(&mut self, input: Self::Input) -> Result<Self::Output>;
    fn load(&mut self, output: Self::Output) -> Result<Self::Loaded>;

    fn process(&mut self) -> Result<Self::Loaded> {
        info!(etl_name = self.etl_name(); "Starting ETL process");

        info!(etl_name = self.etl_name(); "Extracting");
        let input = match self.extract() {
            Ok(input) => Ok(input),
            Err(err) => {
                let message = err.to_string();
                error!(etl_name = self.etl_name(), kind = err.kind().as_str(), err = message.as_str(); "Extraction failed with error");
                Err(err)
            },
        }?;

        info!(etl_name = self.etl_name(); "Transforming");
        let output = match self.transform(input) {
            Ok(output) => Ok(output),
            Err(err) => {
                let message = err.to_string();
                error!(etl_name = self.etl_name(), kind = err.kind().as_str(), err = message.as_str(); "Transformation failed with error");
                Err(err)
            },
        }?;

        info!(etl_name = self.etl_name(); "Loading");
        let loaded = match self.load(output) {
            Ok(loaded) => Ok(loaded),
            Err(err) => {
                let message = err.to_string();
                error!(etl_name = self.etl_name(), kind = err.kind().as_str(), err = message.as_str(); "Loading failed with error");
                Err(err)
            },
        }?;

        info!(etl_name = self.etl_name(); "Process finished");
        Ok(loaded)
    }
}

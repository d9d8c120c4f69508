use crate::output::OutputFormat;
use courserank::config::{ConfigLoader, CourseRankConfig, LogLevel};
use courserank::pipeline::CourseMatcher;
use std::path::Path;

pub struct CourseRankCliContext {
    pub config: CourseRankConfig,
}

impl CourseRankCliContext {
    /// Load configuration from the default files, an explicit file and the
    /// environment, in that order of precedence (later wins).
    pub fn load(config_file: Option<&Path>) -> courserank::Result<Self> {
        let mut loader = ConfigLoader::new();
        loader.load_default_files();
        if let Some(path) = config_file {
            loader.load_file(path)?;
        }
        loader.load_env();

        Ok(Self {
            config: loader.extract()?,
        })
    }

    pub fn from_config(config: CourseRankConfig) -> Self {
        Self { config }
    }

    /// Pick the log level from the verbosity flags.
    ///
    /// JSON output implies quiet so stdout stays parseable.
    pub fn set_verbosity(&mut self, verbose: bool, quiet: bool, output: OutputFormat) {
        self.config.logging.level = if quiet || output == OutputFormat::Json {
            LogLevel::Error
        } else if verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        };
    }

    pub async fn matcher(&self) -> courserank::Result<CourseMatcher> {
        courserank::init(self.config.clone()).await
    }
}

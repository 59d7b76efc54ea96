use std::ffi::OsStr;
use std::fs::File;

use justconfig::error::ConfigError;
use justconfig::item::ValueExtractor;
use justconfig::processors::Trim;
use justconfig::sources::env::Env;
use justconfig::sources::text::ConfigText;
use justconfig::ConfPath;
use justconfig::Config;

use crate::config_processors::Unquote;
use crate::error::{CfError, Result};
use crate::io::UserOrder;
use crate::itemknn::similarity::StrategyKind;
use crate::itemknn::{ModelParams, DEFAULT_K_NEIGHBORS, DEFAULT_TOP_N};

// Set some default values
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_OUTPUT_PATH: &str = "recommendations.txt";

pub struct AppConfig {
    pub log: LogConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    pub output: OutputConfig,
    pub evaluation: EvaluationConfig,
}

pub struct LogConfig {
    pub level: String,
}

pub struct DataConfig {
    pub training_data_path: String,
    pub output_path: String,
    pub skip_malformed_lines: bool,
}

pub struct ModelConfig {
    pub strategy: StrategyKind,
    pub k_neighbors: usize,
    pub top_n: usize,
}

pub struct OutputConfig {
    pub user_order: UserOrder,
}

pub struct EvaluationConfig {
    pub test_data_path: Option<String>,
}

impl AppConfig {
    pub fn new(config_path: String) -> Result<AppConfig> {
        // Initialize config object
        let mut conf = Config::default();

        // Check if there is a config file
        if let Ok(config_file) = File::open(&config_path) {
            let config_text = ConfigText::new(config_file, &config_path)
                .map_err(|err| CfError::Config(format!("loading {} failed: {}", config_path, err)))?;
            conf.add_source(config_text);
        }

        // Define config params from environment variables
        let config_env = Env::new(&[
            (
                ConfPath::from(&["data", "training_data_path"]),
                OsStr::new("TRAINING_DATA"),
            ),
            (
                ConfPath::from(&["data", "output_path"]),
                OsStr::new("OUTPUT_PATH"),
            ),
            (
                ConfPath::from(&["evaluation", "test_data_path"]),
                OsStr::new("TEST_DATA"),
            ),
        ]);
        conf.add_source(config_env);

        // Parse into custom config struct
        AppConfig::parse(conf)
    }

    fn parse(conf: justconfig::Config) -> Result<AppConfig> {
        Ok(AppConfig {
            log: LogConfig::parse(&conf, ConfPath::from(&["log"]))?,
            data: DataConfig::parse(&conf, ConfPath::from(&["data"]))?,
            model: ModelConfig::parse(&conf, ConfPath::from(&["model"]))?,
            output: OutputConfig::parse(&conf, ConfPath::from(&["output"]))?,
            evaluation: EvaluationConfig::parse(&conf, ConfPath::from(&["evaluation"]))?,
        })
    }
}

impl LogConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<LogConfig> {
        Ok(LogConfig {
            level: or_default(
                conf.get(path.push("level")).unquote().value(),
                String::from(DEFAULT_LOG_LEVEL),
                "log.level",
            )?,
        })
    }

    /// Installs `env_logger` with the configured level; `RUST_LOG` takes precedence.
    pub fn init_logger(&self) {
        let env = env_logger::Env::default().default_filter_or(self.level.as_str());
        env_logger::Builder::from_env(env).init();
    }
}

impl DataConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<DataConfig> {
        Ok(DataConfig {
            training_data_path: conf
                .get(path.push("training_data_path"))
                .unquote()
                .value()
                .map_err(|err| CfError::Config(format!("data.training_data_path: {}", err)))?,
            output_path: or_default(
                conf.get(path.push("output_path")).unquote().value(),
                String::from(DEFAULT_OUTPUT_PATH),
                "data.output_path",
            )?,
            skip_malformed_lines: or_default(
                conf.get(path.push("skip_malformed_lines")).trim().value(),
                false,
                "data.skip_malformed_lines",
            )?,
        })
    }
}

impl ModelConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<ModelConfig> {
        let strategy: Option<String> =
            optional(conf.get(path.push("strategy")).unquote().value(), "model.strategy")?;
        let strategy = match strategy {
            Some(raw) => parse_choice::<StrategyKind>(&raw, "model.strategy")?,
            None => StrategyKind::default(),
        };
        let k_neighbors = or_default(
            conf.get(path.push("k_neighbors")).trim().value(),
            DEFAULT_K_NEIGHBORS,
            "model.k_neighbors",
        )?;
        let top_n = or_default(
            conf.get(path.push("top_n")).trim().value(),
            DEFAULT_TOP_N,
            "model.top_n",
        )?;
        if k_neighbors == 0 {
            return Err(CfError::Config(String::from("model.k_neighbors must be positive")));
        }
        if top_n == 0 {
            return Err(CfError::Config(String::from("model.top_n must be positive")));
        }
        Ok(ModelConfig {
            strategy,
            k_neighbors,
            top_n,
        })
    }

    pub fn params(&self) -> ModelParams {
        ModelParams {
            k_neighbors: self.k_neighbors,
            top_n: self.top_n,
        }
    }
}

impl OutputConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<OutputConfig> {
        let user_order: Option<String> =
            optional(conf.get(path.push("user_order")).unquote().value(), "output.user_order")?;
        let user_order = match user_order {
            Some(raw) => parse_choice::<UserOrder>(&raw, "output.user_order")?,
            None => UserOrder::default(),
        };
        Ok(OutputConfig { user_order })
    }
}

impl EvaluationConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<EvaluationConfig> {
        Ok(EvaluationConfig {
            test_data_path: optional(
                conf.get(path.push("test_data_path")).unquote().value(),
                "evaluation.test_data_path",
            )?,
        })
    }
}

/// A missing key yields `None`; a value that is present but unreadable is an error.
fn optional<T>(value: std::result::Result<T, ConfigError>, key: &str) -> Result<Option<T>> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::ValueNotFound { .. }) => Ok(None),
        Err(err) => Err(CfError::Config(format!("{}: {}", key, err))),
    }
}

fn or_default<T>(value: std::result::Result<T, ConfigError>, default: T, key: &str) -> Result<T> {
    Ok(optional(value, key)?.unwrap_or(default))
}

fn parse_choice<T>(raw: &str, key: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|err| CfError::Config(format!("{}: {}", key, err)))
}

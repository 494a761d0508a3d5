/// 環境変数と実行環境の設定
pub mod environment;

pub use environment::{
    get_environment, initialize_logging_system, load_environment_variables, ApiConfig,
    Environment, EnvironmentConfig, StorageConfig,
};

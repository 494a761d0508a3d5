use std::env;

fn main() {
    // ビルド時に環境変数を設定
    // 環境変数は外部（スクリプトや .env ファイル）から提供されることを前提とする
    // 未設定の項目は実行時のデフォルト値にフォールバックする
    let _ = dotenv::dotenv();

    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    println!("cargo:rustc-env=ENVIRONMENT={}", environment);

    // API設定
    let api_server_url =
        env::var("API_SERVER_URL").unwrap_or_else(|_| "http://localhost:5678".to_string());
    let api_timeout = env::var("API_TIMEOUT_SECONDS").unwrap_or_else(|_| "30".to_string());
    let api_max_retries = env::var("API_MAX_RETRIES").unwrap_or_else(|_| "3".to_string());

    println!("cargo:rustc-env=API_SERVER_URL={}", api_server_url);
    println!("cargo:rustc-env=API_TIMEOUT_SECONDS={}", api_timeout);
    println!("cargo:rustc-env=API_MAX_RETRIES={}", api_max_retries);

    // ログレベル
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    println!("cargo:rustc-env=LOG_LEVEL={}", log_level);

    println!("cargo:rerun-if-env-changed=ENVIRONMENT");
    println!("cargo:rerun-if-env-changed=API_SERVER_URL");
    println!("cargo:rerun-if-env-changed=API_TIMEOUT_SECONDS");
    println!("cargo:rerun-if-env-changed=API_MAX_RETRIES");
    println!("cargo:rerun-if-env-changed=LOG_LEVEL");
}

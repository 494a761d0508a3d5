// Billed デモ実行ファイル
//
// 第1引数にメールアドレスを渡すと従業員セッションを作成してから起動する

use billed_app::shared::storage::{save_user, SessionUser};
use log::{error, info};

#[tokio::main]
async fn main() {
    let app = match billed_app::bootstrap() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("アプリケーションの初期化に失敗しました: {e}");
            std::process::exit(1);
        }
    };

    if let Some(email) = std::env::args().nth(1) {
        if let Err(e) = save_user(app.storage.as_ref(), &SessionUser::employee(email)) {
            error!("セッションの保存に失敗しました: {e}");
        }
    }

    app.router.start().await;
    if let Some(page) = app.router.active_page() {
        info!("表示中のページ: {}", page.path());
    }

    println!("{}", app.document.to_html());
}


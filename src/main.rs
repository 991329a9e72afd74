use std::net::SocketAddr;
use tokio::net::TcpListener;

use ladle::{build_app, cli, db};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/ladle.db".to_string());

    let pool = db::init_pool(&database_url).await;

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        let result = match args[1].as_str() {
            "create-user" if args.len() == 6 => {
                cli::create_user(&pool, &args[2], &args[3], &args[4], &args[5]).await
            }
            "import-ingredients" if args.len() == 3 => {
                cli::import_ingredients(&pool, &args[2]).await
            }
            "import-tags" if args.len() == 3 => cli::import_tags(&pool, &args[2]).await,
            _ => {
                eprintln!("Usage:");
                eprintln!("  ladle create-user <email> <username> <first_name> <last_name>");
                eprintln!("  ladle import-ingredients <file.json>");
                eprintln!("  ladle import-tags <file.json>");
                std::process::exit(1);
            }
        };
        if let Err(e) = result {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let secure_cookies = std::env::var("SECURE_COOKIES").is_ok();
    let app = build_app(pool, secure_cookies).await;

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = TcpListener::bind(addr).await.unwrap();

    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await.unwrap();
}

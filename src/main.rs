use chirpy::{
    auth::JwtService,
    config::AppConfig,
    db,
    middleware::AppState,
    routes,
    services::AuthService,
    telemetry,
};
use std::sync::atomic::AtomicI64;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("chirpy {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    if let Ok(env_name) = std::env::var("CHIRPY_ENV") {
        dotenv::from_filename(format!(".env.{}", env_name)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();
    }

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    telemetry::init_telemetry(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Chirpy starting...");

    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    tracing::info!("Database initialized");

    let jwt_service = Arc::new(JwtService::from_config(&config)?);
    let auth_service = Arc::new(AuthService::new(
        db_pool.clone(),
        jwt_service.clone(),
        Arc::new(config.clone()),
    ));

    let state = Arc::new(AppState {
        config: config.clone(),
        db: db_pool,
        jwt_service,
        auth_service,
        fileserver_hits: Arc::new(AtomicI64::new(0)),
    });

    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.server.addr).await?;
    tracing::info!(addr = %config.server.addr, "Listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    // 收到信号后最多等待配置的排空窗口，超时则放弃在途请求
    let drain_window = Duration::from_secs(config.server.graceful_shutdown_timeout_secs);
    tokio::select! {
        result = server => {
            result?;
            tracing::info!("Shutdown complete");
        }
        _ = async {
            shutdown_signal().await;
            tokio::time::sleep(drain_window).await;
        } => {
            tracing::warn!(
                timeout_secs = config.server.graceful_shutdown_timeout_secs,
                "Drain window elapsed, forcing shutdown"
            );
        }
    }

    Ok(())
}

/// 等待终止信号（Ctrl+C 或 SIGTERM）
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

fn print_help() {
    println!("chirpy - 消息板后端服务");
    println!();
    println!("用法: chirpy [OPTIONS]");
    println!();
    println!("选项:");
    println!("  --version    打印版本号");
    println!("  --help       打印帮助信息");
    println!();
    println!("配置通过 CHIRPY_ 前缀的环境变量加载，例如 CHIRPY_DATABASE__URL");
}

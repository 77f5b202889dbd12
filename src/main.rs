use anyhow::{Context, Result};
use quiz_link::{logger, App, Command, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    if config.verbose_logging {
        logger::init_verbose();
    } else {
        logger::init();
    }

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    // 初始化并运行应用
    let app = App::initialize(config).context("初始化应用失败")?;
    match app.run(command).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&e.to_response())?);
            std::process::exit(1);
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use quiz_bridge::diagnostics::{self, DEFAULT_SERVER_URL, DEMO_QUIZ_URL};
use quiz_bridge::utils::logging;
use quiz_bridge::{App, Config};

#[derive(Parser)]
#[command(name = "quiz_bridge", version, about = "渲染题目页面、调用模型求解并提交答案")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// 启动 HTTP 服务（默认）
    Serve,
    /// 向模型发送一条测试消息
    CheckLlm,
    /// 向运行中的服务发送一次演示请求
    CheckServer {
        /// 服务地址
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        base_url: String,
        /// 题目页面
        #[arg(long, default_value = DEMO_QUIZ_URL)]
        quiz_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env（不存在时忽略）
    let _ = dotenvy::dotenv();

    // 初始化日志
    logging::init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            // 缺少必需变量时在监听端口之前退出
            let config = Config::from_env()?;
            App::initialize(config).await?.run().await?;
        }
        Command::CheckLlm => {
            let config = Config::from_env()?;
            let reply = diagnostics::check_llm(&config).await?;
            println!("\n模型响应:\n{}\n\n✅ 测试成功", reply);
        }
        Command::CheckServer { base_url, quiz_url } => {
            let email = std::env::var("STUDENT_EMAIL")
                .unwrap_or_else(|_| "example@student.com".to_string());
            let secret = std::env::var("STUDENT_SECRET")
                .unwrap_or_else(|_| "placeholder_secret".to_string());

            let check = diagnostics::check_server(&base_url, &email, &secret, &quiz_url).await?;
            println!("\n响应状态码: {}", check.status);
            match &check.json {
                Some(body) => println!("响应 JSON:\n{}", serde_json::to_string_pretty(body)?),
                None => println!("原始响应:\n{}", check.raw),
            }

            if check.passed() {
                println!("\n✅ 测试通过：服务接受了请求\n");
            } else {
                println!("\n❌ 测试失败：服务拒绝了请求\n");
            }
        }
    }

    Ok(())
}

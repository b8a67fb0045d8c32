//! 统一的环境变量管理系统
//!
//! 类型安全、可验证的环境变量访问。环境变量的优先级低于命令行参数，
//! 高于配置文件。

use std::env;
use std::fmt;

use crate::core::ShelfOptions;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// `None` when the variable is unset
    fn get_optional() -> EnvResult<Option<T>> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 日志级别
pub struct LogLevel;
impl EnvVar<String> for LogLevel {
    const NAME: &'static str = "TOPSHELF_LOG_LEVEL";
    const DEFAULT: Option<String> = None;
    const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

    fn get() -> EnvResult<String> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok("info".to_string()),
        }
    }

    fn parse(value: &str) -> EnvResult<String> {
        match value.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
            _ => Err(EnvError {
                variable: Self::NAME.to_string(),
                message: format!("Invalid log level '{}'. Use: trace, debug, info, warn, error", value),
            }),
        }
    }
}

/// 禁用颜色输出
pub struct NoColor;
impl EnvVar<bool> for NoColor {
    const NAME: &'static str = "NO_COLOR";
    const DEFAULT: Option<bool> = Some(false);
    const DESCRIPTION: &'static str = "Disable colored output when set to any value";

    fn parse(value: &str) -> EnvResult<bool> {
        // NO_COLOR 遵循标准：任何值都表示禁用颜色
        Ok(!value.is_empty())
    }
}

/// 下载使用的 User-Agent
pub struct UserAgent;
impl EnvVar<String> for UserAgent {
    const NAME: &'static str = "TOPSHELF_USER_AGENT";
    const DEFAULT: Option<String> = None;
    const DESCRIPTION: &'static str = "User-Agent header sent with every download";

    fn parse(value: &str) -> EnvResult<String> {
        let user_agent = value.trim();
        if user_agent.is_empty() {
            return Err(EnvError {
                variable: Self::NAME.to_string(),
                message: "User agent cannot be empty".to_string(),
            });
        }
        Ok(user_agent.to_string())
    }
}

/// 网络超时（秒）
pub struct Timeout;
impl EnvVar<u64> for Timeout {
    const NAME: &'static str = "TOPSHELF_TIMEOUT";
    const DEFAULT: Option<u64> = None;
    const DESCRIPTION: &'static str = "Network timeout in seconds";

    fn parse(value: &str) -> EnvResult<u64> {
        parse_bounded_u64(value, Self::NAME, 1, 3600)
    }
}

fn parse_bounded_u64(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<u64> {
    let num: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 环境变量配置汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub log_level: String,
    pub no_color: bool,
    pub user_agent: Option<String>,
    pub timeout: Option<u64>,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: LogLevel::get()?,
            no_color: NoColor::get()?,
            user_agent: UserAgent::get_optional()?,
            timeout: Timeout::get_optional()?,
        })
    }

    /// Overrides the download settings of `options` with whatever is set
    pub fn apply_to(&self, options: &mut ShelfOptions) {
        if let Some(user_agent) = &self.user_agent {
            options.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.timeout {
            options.timeout = timeout;
        }
    }
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("Environment variables:\n");
    for (name, description) in [
        (LogLevel::NAME, LogLevel::DESCRIPTION),
        (NoColor::NAME, NoColor::DESCRIPTION),
        (UserAgent::NAME, UserAgent::DESCRIPTION),
        (Timeout::NAME, Timeout::DESCRIPTION),
    ] {
        docs.push_str(&format!("  {name:<20} {description}\n"));
    }
    docs
}

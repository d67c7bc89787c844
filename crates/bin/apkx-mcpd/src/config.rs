use clap::{Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use apkx_mcp::server::DEFAULT_MCP_HTTP_ADDR;

const DEFAULT_JADX_PATH: &str = "jadx";
const DEFAULT_APKTOOL_PATH: &str = "apktool";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_FILE_NAME: &str = "apkx-mcp.log";

#[derive(Parser, Debug)]
#[command(name = "apkx-mcpd", version, about = "apkx MCP daemon.")]
struct CliArgs {
    #[arg(long, env = "APKX_JADX_PATH", default_value = DEFAULT_JADX_PATH)]
    jadx_path: String,

    #[arg(long, env = "APKX_APKTOOL_PATH", default_value = DEFAULT_APKTOOL_PATH)]
    apktool_path: String,

    #[arg(long, env = "APKX_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    #[arg(long, env = "APKX_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[arg(long, env = "APKX_LOG", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[arg(
        long = "http",
        env = "APKX_HTTP",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    http: bool,

    #[arg(long, env = "APKX_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    http_addr: SocketAddr,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone, Debug)]
pub struct ApkxConfig {
    pub jadx_path: PathBuf,
    pub apktool_path: PathBuf,
    pub scratch_dir: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
    pub http: bool,
    pub http_addr: SocketAddr,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value:?}")
            }
        }
    }
}

impl Error for ConfigError {}

impl ApkxConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        let args = CliArgs::parse();
        Self::try_from(args)
    }
}

impl TryFrom<CliArgs> for ApkxConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let jadx_path = non_blank("APKX_JADX_PATH", args.jadx_path)?;
        let apktool_path = non_blank("APKX_APKTOOL_PATH", args.apktool_path)?;
        let log_level = non_blank("APKX_LOG", args.log_level)?;

        let scratch_dir = args
            .scratch_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(std::env::temp_dir);
        let log_file = args
            .log_file
            .filter(|file| !file.as_os_str().is_empty())
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_FILE_NAME));

        Ok(Self {
            jadx_path: PathBuf::from(jadx_path),
            apktool_path: PathBuf::from(apktool_path),
            scratch_dir,
            log_file,
            log_level,
            http: args.http,
            http_addr: args.http_addr,
        })
    }
}

fn non_blank(name: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidSetting { name, value });
    }
    Ok(trimmed.to_string())
}

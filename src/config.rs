use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::store::queries::{DEFAULT_RANK_THRESHOLD, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TEXT_CONFIG};

#[derive(Deserialize, Clone)]
pub struct Site {
    pub title: String,
    /// Scheme and host used for absolute links (feed, sitemap, shared posts)
    pub base_url: String,
    pub description: String,
}

#[derive(Deserialize, Clone)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
}

#[derive(Deserialize, Clone)]
pub struct Defaults {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_similar_post_count")]
    pub similar_post_count: i64,
    #[serde(default = "default_sidebar_post_count")]
    pub sidebar_post_count: i64,
}

#[derive(Deserialize, Clone)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct Database {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Deserialize, Clone)]
pub struct Search {
    #[serde(default = "default_text_config")]
    pub text_config: String,
    #[serde(default = "default_rank_threshold")]
    pub rank_threshold: f32,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
}

#[derive(Deserialize, Clone)]
pub struct RssFeed {
    pub title: String,
    pub description: String,
    #[serde(default = "default_feed_item_count")]
    pub item_count: i64,
    #[serde(default = "default_summary_word_count")]
    pub summary_word_count: usize,
}

#[derive(Deserialize, Clone)]
pub struct Mail {
    /// Empty host means log-only mode
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    #[serde(default)]
    pub starttls: bool,
}

#[derive(Deserialize, Clone)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Clone)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    #[serde(default)]
    pub defaults: Defaults,
    pub server: Server,
    pub database: Database,
    #[serde(default)]
    pub search: Search,
    pub rss_feed: RssFeed,
    pub mail: Option<Mail>,
    pub log: Option<Log>,
}

fn default_page_size() -> u32 { 2 }
fn default_similar_post_count() -> i64 { 4 }
fn default_sidebar_post_count() -> i64 { 5 }
fn default_max_connections() -> u32 { 5 }
fn default_text_config() -> String { DEFAULT_TEXT_CONFIG.to_string() }
fn default_rank_threshold() -> f32 { DEFAULT_RANK_THRESHOLD }
fn default_similarity_threshold() -> f32 { DEFAULT_SIMILARITY_THRESHOLD }
fn default_feed_item_count() -> i64 { 5 }
fn default_summary_word_count() -> usize { 30 }
fn default_smtp_port() -> u16 { 25 }

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            page_size: default_page_size(),
            similar_post_count: default_similar_post_count(),
            sidebar_post_count: default_sidebar_post_count(),
        }
    }
}

impl Default for Search {
    fn default() -> Self {
        Search {
            text_config: default_text_config(),
            rank_threshold: default_rank_threshold(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    if !path.starts_with("${exe_dir}") {
        return Ok(path);
    }

    let cur_exe = env::current_exe()?;
    let exe_dir = cur_exe.parent().unwrap_or_else(|| Path::new("."));
    let relative = path.strip_prefix("${exe_dir}")
        .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e))?;
    Ok(exe_dir.join(relative))
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir)?,
        public_dir: parse_path(cfg.paths.public_dir)?,
    };

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

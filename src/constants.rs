//! Shared constants for the trending aggregation pipeline.

/// Curated language list; filters out rarely requested or noisy languages.
///
/// `"all"` is the sentinel for "no language filter".
pub const CURATED_LANGUAGES: &[&str] = &[
    "all",
    "python",
    "javascript",
    "typescript",
    "go",
    "java",
    "c",
    "c++",
    "c#",
    "rust",
    "ruby",
    "php",
    "swift",
    "kotlin",
    "scala",
    "dart",
    "css",
    "shell",
    "haskell",
    "elixir",
    "clojure",
    "r",
    "perl",
    "objective-c",
];

/// Sentinel language meaning "no language filter"
pub const GLOBAL_LANGUAGE: &str = "all";

/// Default number of repositories returned per request
pub const DEFAULT_LIMIT: u32 = 10;

/// Maximum number of repositories per language partition
pub const MAX_LIMIT: u32 = 100;

/// GitHub Trending page entry point
pub const GITHUB_TRENDING_URL: &str = "https://github.com/trending";

/// GitHub REST API entry point
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// User-Agent sent on every outbound request
pub const USER_AGENT: &str = "GitHub-Trending-MCP/0.1 (+https://github.com)";

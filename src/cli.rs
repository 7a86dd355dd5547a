use clap::Parser;
use url::Url;

use crate::planner::Config;
use crate::restaurant::Credentials;

/// Find an evening that suits every friend: a free day, a movie and a table.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Start page linking the calendar, cinema and restaurant sites
    #[arg(value_name = "URL")]
    pub url: Url,

    /// Restaurant login name
    #[arg(long, env = "PLANNER_USERNAME", default_value = "zeke")]
    pub username: String,

    /// Restaurant login password
    #[arg(long, env = "PLANNER_PASSWORD", default_value = "coys", hide_env_values = true)]
    pub password: String,

    /// Log every request to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            start_url: self.url.clone(),
            credentials: Credentials {
                username: self.username.clone(),
                password: self.password.clone(),
            },
        }
    }
}

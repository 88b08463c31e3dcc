use clap::{Parser, ValueEnum};

/// Sweep a login endpoint with every username × password combination
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Target URL (or, in cmd mode, a command template containing the field tokens)
    #[arg(short = 't', default_value = "http://localhost")]
    pub target: String,

    /// Newline-delimited usernames file
    #[arg(short = 'u', default_value = "usernames.txt")]
    pub usernames: String,

    /// Newline-delimited passwords file
    #[arg(short = 'p', default_value = "passwords.txt")]
    pub passwords: String,

    /// How each attempt is sent
    #[arg(short = 'm', value_enum)]
    pub mode: Mode,

    /// Username field name (json/form) or token to substitute (cmd)
    #[arg(short = 'n', default_value = "username")]
    pub username_field: String,

    /// Password field name (json/form) or token to substitute (cmd)
    #[arg(short = 's', default_value = "password")]
    pub password_field: String,

    /// Number of concurrent workers
    #[arg(short = 'w', default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub workers: u32,

    /// Extra body fields: key=value pairs joined by ',' (json) or '&' (form)
    #[arg(short = 'b', default_value = "")]
    pub extra_body: String,

    /// Comma-separated texts whose presence in the response means the login failed
    #[arg(short = 'f', default_value = "")]
    pub failure_text: String,

    /// Print transport errors as they happen
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Per-attempt timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Progress refresh interval in milliseconds
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// POST a JSON object
    Json,
    /// POST an urlencoded form
    Form,
    /// Run a local command
    Cmd,
}

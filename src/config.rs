use clap::Parser;
use std::env;

/// Q&A web service configuration. Defaults come from the CLI definition,
/// an optional `setup.toml` can override the log level, and environment
/// variables win over both.
#[derive(Parser, Debug, PartialEq)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    /// Which errors we want to log (info, warn or error)
    #[clap(short, long, default_value = "warn")]
    pub log_level: String,
    /// Which PORT the server is listening to
    #[clap(short, long, default_value = "8080")]
    pub port: u16,
    /// Database user
    #[clap(long, default_value = "user")]
    pub db_user: String,
    /// Database password
    #[clap(long, default_value = "password")]
    pub db_password: String,
    /// URL of the postgres database
    #[clap(long, default_value = "localhost")]
    pub db_host: String,
    /// PORT number for the database connection
    #[clap(long, default_value = "5432")]
    pub db_port: u16,
    /// Database name
    #[clap(long, default_value = "campusqa")]
    pub db_name: String,
}

impl Config {
    pub fn new() -> Result<Config, handle_errors::Error> {
        let config = Config::parse();

        // setup.toml is optional; deployments that only use env vars
        // simply don't ship one.
        let file = ::config::Config::builder()
            .add_source(::config::File::with_name("setup").required(false))
            .build()
            .ok();
        let log_level = file
            .and_then(|f| f.get_string("log_level").ok())
            .unwrap_or(config.log_level);

        let port = env::var("PORT")
            .ok()
            .map(|val| val.parse::<u16>())
            .unwrap_or(Ok(config.port))
            .map_err(handle_errors::Error::ParseError)?;

        let db_user = env::var("POSTGRES_USER").unwrap_or_else(|_| config.db_user.to_owned());
        let db_password =
            env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| config.db_password.to_owned());
        let db_host = env::var("POSTGRES_HOST").unwrap_or_else(|_| config.db_host.to_owned());
        let db_port =
            env::var("POSTGRES_PORT").unwrap_or_else(|_| config.db_port.to_string());
        let db_name = env::var("POSTGRES_DB").unwrap_or_else(|_| config.db_name.to_owned());

        Ok(Config {
            log_level,
            port,
            db_user,
            db_password,
            db_host,
            db_port: db_port
                .parse::<u16>()
                .map_err(handle_errors::Error::ParseError)?,
            db_name,
        })
    }
}

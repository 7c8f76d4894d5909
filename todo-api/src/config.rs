use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Full connection URL. Takes precedence over the individual `db_*` parts.
    #[serde(default)]
    pub db_url: Option<String>,
    #[serde(default)]
    pub db_user: String,
    #[serde(default)]
    pub db_password: String,
    #[serde(default)]
    pub db_host: String,
    #[serde(default)]
    pub db_name: String,
    #[serde(default = "default_db_port")]
    pub db_port: u16,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Inserts a few demo todos on startup when the table is empty.
    #[serde(default)]
    pub seed_demo_todos: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Missing database settings do not fail here; they surface as a connection
    /// error the first time the pool is used.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_environment(config::Environment::default())
    }

    pub(crate) fn from_environment(environment: config::Environment) -> anyhow::Result<Self> {
        let settings = config::Config::builder().add_source(environment).build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_port() -> u16 {
    8080
}

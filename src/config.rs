//! Configuração do jobpoll: defaults, arquivo `jobpoll.toml` e variáveis de ambiente.
//!
//! A struct [`Settings`] agrupa os parâmetros do servidor ([`ServerSettings`])
//! e do cliente ([`ClientSettings`]). Valores ausentes no arquivo usam defaults.
//! Variáveis de ambiente têm precedência sobre o arquivo, e o resultado é
//! validado antes de ser usado.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::state_machine::StatusPolicy;

/// Nome do arquivo de configuração procurado no diretório atual.
pub const DEFAULT_CONFIG_FILE: &str = "jobpoll.toml";

/// Configuração de nível superior.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Nível de log (`error`, `warn`, `info`, `debug`, `trace`) ou diretiva `EnvFilter`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub client: ClientSettings,
}

/// Parâmetros do servidor e do ciclo de vida dos jobs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Limite inferior (segundos) da duração sorteada para cada job.
    pub min_delay: f64,
    /// Limite superior (segundos) da duração sorteada para cada job.
    pub max_delay: f64,
    /// Probabilidade de erro transitório em cada consulta.
    pub error_rate: f64,
    pub status_policy: StatusPolicy,
    /// Semente opcional para sorteios determinísticos.
    pub random_seed: Option<u64>,
}

/// Parâmetros do cliente de polling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub base_url: String,
    /// Intervalo inicial entre consultas, em segundos.
    pub initial_interval: f64,
    /// Teto do intervalo entre consultas, em segundos.
    pub max_interval: f64,
    pub backoff_factor: f64,
    /// Falhas de transporte consecutivas toleradas dentro do loop de espera.
    pub transport_retries: u32,
    /// Timeout de cada requisição HTTP, em segundos.
    pub request_timeout: f64,
}

// Valor padrão para o nível de log: "info".
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            server: ServerSettings::default(),
            client: ClientSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            min_delay: 10.0,
            max_delay: 30.0,
            error_rate: 0.05,
            status_policy: StatusPolicy::Sticky,
            random_seed: None,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            initial_interval: 1.0,
            max_interval: 30.0,
            backoff_factor: 1.5,
            transport_retries: 0,
            request_timeout: 10.0,
        }
    }
}

impl Settings {
    /// Carrega a configuração completa: arquivo (se houver), ambiente e validação.
    ///
    /// Sem `path`, procura `jobpoll.toml` no diretório atual e usa os
    /// defaults se ele não existir. Um `path` explícito precisa existir.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Sobrescreve campos com as variáveis de ambiente presentes.
    ///
    /// `lookup` abstrai `std::env::var` para que os testes não precisem
    /// alterar o ambiente do processo.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }

        if let Some(host) = lookup("HOST").filter(|v| !v.trim().is_empty()) {
            self.server.host = host.trim().to_string();
        }
        override_parsed(&lookup, "PORT", &mut self.server.port)?;
        override_parsed(&lookup, "MIN_DELAY", &mut self.server.min_delay)?;
        override_parsed(&lookup, "MAX_DELAY", &mut self.server.max_delay)?;
        override_parsed(&lookup, "ERROR_RATE", &mut self.server.error_rate)?;
        override_parsed(&lookup, "STATUS_POLICY", &mut self.server.status_policy)?;
        if let Some(seed) = parse_var::<u64>(&lookup, "RANDOM_SEED")? {
            self.server.random_seed = Some(seed);
        }

        if let Some(url) = lookup("SERVER_URL").filter(|v| !v.trim().is_empty()) {
            self.client.base_url = url.trim().to_string();
        }
        override_parsed(&lookup, "INITIAL_INTERVAL", &mut self.client.initial_interval)?;
        override_parsed(&lookup, "MAX_INTERVAL", &mut self.client.max_interval)?;
        override_parsed(&lookup, "BACKOFF_FACTOR", &mut self.client.backoff_factor)?;
        override_parsed(&lookup, "TRANSPORT_RETRIES", &mut self.client.transport_retries)?;
        override_parsed(&lookup, "REQUEST_TIMEOUT", &mut self.client.request_timeout)?;

        Ok(())
    }

    /// Rejeita combinações inválidas antes de qualquer componente iniciar.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.server;
        let c = &self.client;

        for (name, value) in [
            ("min_delay", s.min_delay),
            ("max_delay", s.max_delay),
            ("error_rate", s.error_rate),
            ("initial_interval", c.initial_interval),
            ("max_interval", c.max_interval),
            ("backoff_factor", c.backoff_factor),
            ("request_timeout", c.request_timeout),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be a finite number")));
            }
        }

        if s.min_delay < 0.0 {
            return Err(ConfigError::Invalid("min_delay must not be negative".into()));
        }
        if s.min_delay > s.max_delay {
            return Err(ConfigError::Invalid(format!(
                "min_delay ({}) must not exceed max_delay ({})",
                s.min_delay, s.max_delay
            )));
        }
        if !(0.0..=1.0).contains(&s.error_rate) {
            return Err(ConfigError::Invalid(format!(
                "error_rate ({}) must be between 0 and 1",
                s.error_rate
            )));
        }
        if c.initial_interval <= 0.0 {
            return Err(ConfigError::Invalid("initial_interval must be positive".into()));
        }
        if c.initial_interval > c.max_interval {
            return Err(ConfigError::Invalid(format!(
                "initial_interval ({}) must not exceed max_interval ({})",
                c.initial_interval, c.max_interval
            )));
        }
        if c.backoff_factor < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "backoff_factor ({}) must be at least 1.0",
                c.backoff_factor
            )));
        }
        if c.request_timeout <= 0.0 {
            return Err(ConfigError::Invalid("request_timeout must be positive".into()));
        }

        // Todos os campos em segundos viram `Duration` na inicialização.
        for (name, value) in [
            ("min_delay", s.min_delay),
            ("max_delay", s.max_delay),
            ("initial_interval", c.initial_interval),
            ("max_interval", c.max_interval),
            ("request_timeout", c.request_timeout),
        ] {
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "{name} ({value}) is too large for a duration"
                )));
            }
        }

        Ok(())
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::InvalidVar {
            key: key.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
}

fn override_parsed<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = parse_var(lookup, key)? {
        *target = value;
    }
    Ok(())
}

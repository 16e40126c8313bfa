//! Interface de linha de comando do jobpoll baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (serve, create, status,
//! wait, submit) e flags globais (--config, --verbose).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::state_machine::JobId;

/// jobpoll: servidor de jobs assíncronos e cliente de polling com backoff.
#[derive(Debug, Parser)]
#[command(name = "jobpoll", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho para o arquivo de configuração TOML (padrão: ./jobpoll.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Habilita logs em nível debug.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Opções comuns aos comandos que falam com o servidor.
#[derive(Debug, Clone, Args)]
pub struct ClientArgs {
    /// URL base do servidor (sobrescreve SERVER_URL e o arquivo).
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inicia o servidor HTTP de jobs até receber Ctrl-C.
    Serve {
        /// Endereço de bind (sobrescreve HOST).
        #[arg(long)]
        host: Option<String>,

        /// Porta de bind (sobrescreve PORT).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Cria um job e imprime o id.
    Create {
        #[command(flatten)]
        client: ClientArgs,
    },

    /// Consulta o status atual de um job uma única vez.
    Status {
        job_id: JobId,

        #[command(flatten)]
        client: ClientArgs,
    },

    /// Aguarda um job existente chegar a um status terminal.
    Wait {
        job_id: JobId,

        /// Tempo máximo de espera em segundos.
        #[arg(long)]
        timeout: Option<f64>,

        #[command(flatten)]
        client: ClientArgs,
    },

    /// Cria um job e aguarda sua conclusão.
    Submit {
        /// Tempo máximo de espera em segundos.
        #[arg(long)]
        timeout: Option<f64>,

        #[command(flatten)]
        client: ClientArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_serve_subcommand() {
        let cli = Cli::parse_from(["jobpoll", "serve", "--port", "9001"]);
        match cli.command {
            Command::Serve { host, port } => {
                assert!(host.is_none());
                assert_eq!(port, Some(9001));
            }
            _ => panic!("expected Serve command"),
        }
    }

    #[test]
    fn cli_parses_wait_with_timeout() {
        let cli = Cli::parse_from([
            "jobpoll",
            "wait",
            "1f0c",
            "--timeout",
            "2.5",
            "--url",
            "http://localhost:9000",
        ]);
        match cli.command {
            Command::Wait {
                job_id,
                timeout,
                client,
            } => {
                assert_eq!(job_id.as_str(), "1f0c");
                assert_eq!(timeout, Some(2.5));
                assert_eq!(client.url.as_deref(), Some("http://localhost:9000"));
            }
            _ => panic!("expected Wait command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from(["jobpoll", "--config", "custom.toml", "--verbose", "submit"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Command::Submit { timeout: None, .. }));
    }

    #[test]
    fn cli_requires_job_id_for_status() {
        assert!(Cli::try_parse_from(["jobpoll", "status"]).is_err());
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}

//! Interface de terminal do jobpoll: spinner e saída colorida.
//!
//! Usa `indicatif` para o spinner de progresso e `console` para as cores.
//! O [`PollProgress`] recebe cada status observado pelo loop de polling e
//! atualiza o spinner até o resultado final.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::client::ClientError;
use crate::state_machine::{JobId, JobStatus};

/// Indicador visual da espera por um job no terminal.
///
/// Exibe um spinner enquanto o job está `pending` e mensagens coloridas
/// para `completed` (verde), `error` (vermelho) e timeout (amarelo).
pub struct PollProgress {
    // Spinner do indicatif.
    pb: ProgressBar,
    // Número de consultas observadas até agora.
    polls: u32,
    green: Style,
    red: Style,
    yellow: Style,
}

impl PollProgress {
    /// Inicia o spinner para o job informado.
    pub fn start(job_id: &JobId) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(format!("Waiting for job {job_id}"));
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            polls: 0,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Registra um status observado; usado como observer do loop de polling.
    pub fn observe(&mut self, status: JobStatus) {
        self.polls += 1;
        self.pb
            .set_message(format!("Status: {status} (poll #{})", self.polls));
    }

    /// Finaliza o spinner e exibe o status terminal.
    pub fn finish(&self, status: JobStatus) {
        self.pb.finish_and_clear();
        match status {
            JobStatus::Completed => {
                println!("  {} Job completed", self.green.apply_to("✓"));
            }
            JobStatus::Error => {
                println!("  {} Job finished with error", self.red.apply_to("✗"));
            }
            JobStatus::Pending => {
                println!("  {} Job still pending", self.yellow.apply_to("…"));
            }
        }
    }

    /// Finaliza o spinner após uma falha do cliente.
    pub fn fail(&self, err: &ClientError) {
        self.pb.finish_and_clear();
        let style = match err {
            ClientError::Timeout { .. } => &self.yellow,
            _ => &self.red,
        };
        println!("  {} {err}", style.apply_to("✗"));
    }
}

/// Estilo do status para saídas de uma linha (`status`).
pub fn styled_status(status: JobStatus) -> String {
    let style = match status {
        JobStatus::Pending => Style::new().yellow(),
        JobStatus::Completed => Style::new().green().bold(),
        JobStatus::Error => Style::new().red().bold(),
    };
    style.apply_to(status).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_counts_polls() {
        let mut progress = PollProgress::start(&JobId::from("j"));
        progress.observe(JobStatus::Pending);
        progress.observe(JobStatus::Pending);
        progress.observe(JobStatus::Completed);
        assert_eq!(progress.polls, 3);
        progress.finish(JobStatus::Completed);
    }

    #[test]
    fn styled_status_keeps_text() {
        console::set_colors_enabled(false);
        assert_eq!(styled_status(JobStatus::Error), "error");
    }
}

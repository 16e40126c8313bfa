//! Real server on a loopback port driven by the real HTTP client.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::client::{BackoffConfig, ClientError, JobClient, Poller};
use crate::registry::tests::{ManualClock, ScriptedRandom};
use crate::registry::{JobRegistry, LifecycleConfig};
use crate::server;
use crate::state_machine::{JobId, JobStatus, StatusPolicy};

struct TestServer {
    url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn start(registry: JobRegistry) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server::serve_on(listener, Arc::new(registry), async move {
            rx.await.ok();
        }));
        Self {
            url,
            shutdown: Some(tx),
            handle,
        }
    }

    fn client(&self) -> JobClient {
        let poller = Poller::new(BackoffConfig {
            initial_interval: Duration::from_millis(10),
            max_interval: Duration::from_millis(40),
            factor: 2.0,
        });
        JobClient::with_poller(&self.url, Duration::from_secs(5), poller).unwrap()
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            tx.send(()).ok();
        }
        self.handle.await.unwrap().unwrap();
    }
}

fn scripted(delay: Duration, fail: bool) -> (JobRegistry, Arc<ScriptedRandom>, Arc<ManualClock>) {
    let random = Arc::new(ScriptedRandom::new(delay, fail));
    let clock = Arc::new(ManualClock::new());
    let registry = JobRegistry::with_sources(
        LifecycleConfig {
            min_delay: delay,
            max_delay: delay,
            error_rate: 0.0,
            policy: StatusPolicy::Sticky,
        },
        random.clone(),
        clock.clone(),
    );
    (registry, random, clock)
}

#[tokio::test]
async fn zero_delay_job_completes_on_first_query() {
    let registry = JobRegistry::new(LifecycleConfig {
        min_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
        error_rate: 0.0,
        policy: StatusPolicy::Sticky,
    });
    let server = TestServer::start(registry).await;
    let client = server.client();

    let job_id = client.create_job().await.unwrap();
    assert_eq!(client.get_status(&job_id).await.unwrap(), JobStatus::Completed);

    server.stop().await;
}

#[tokio::test]
async fn forced_error_draw_returns_error_on_first_query() {
    let registry = JobRegistry::new(LifecycleConfig {
        min_delay: Duration::from_secs(60),
        max_delay: Duration::from_secs(60),
        error_rate: 1.0,
        policy: StatusPolicy::Sticky,
    });
    let server = TestServer::start(registry).await;
    let client = server.client();

    let job_id = client.create_job().await.unwrap();
    assert_eq!(client.get_status(&job_id).await.unwrap(), JobStatus::Error);

    server.stop().await;
}

#[tokio::test]
async fn zero_timeout_on_pending_job_times_out_after_one_observation() {
    let (registry, _, _) = scripted(Duration::from_secs(60), false);
    let server = TestServer::start(registry).await;
    let client = server.client();
    let job_id = client.create_job().await.unwrap();

    let mut seen = Vec::new();
    let mut observer = |s: JobStatus| seen.push(s);
    let err = client
        .wait_for_completion(&job_id, Some(&mut observer), Some(Duration::ZERO))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Timeout { job_id: ref id, .. } if *id == job_id));
    assert_eq!(seen, vec![JobStatus::Pending]);

    server.stop().await;
}

#[tokio::test]
async fn wait_for_completion_follows_job_to_completed() {
    let (registry, _, clock) = scripted(Duration::from_secs(30), false);
    let server = TestServer::start(registry).await;
    let client = server.client();
    let job_id = client.create_job().await.unwrap();

    let mut seen = Vec::new();
    let mut observer = |s: JobStatus| {
        seen.push(s);
        // Let the simulated job age by ten seconds per poll.
        clock.advance(Duration::from_secs(10));
    };
    let status = client
        .wait_for_completion(&job_id, Some(&mut observer), Some(Duration::from_secs(10)))
        .await
        .unwrap();

    assert_eq!(status, JobStatus::Completed);
    assert_eq!(
        seen,
        vec![
            JobStatus::Pending,
            JobStatus::Pending,
            JobStatus::Pending,
            JobStatus::Completed
        ]
    );

    server.stop().await;
}

#[tokio::test]
async fn sticky_status_is_stable_across_queries() {
    let (registry, random, _) = scripted(Duration::ZERO, false);
    let server = TestServer::start(registry).await;
    let client = server.client();
    let job_id = client.create_job().await.unwrap();

    assert_eq!(client.get_status(&job_id).await.unwrap(), JobStatus::Completed);
    random.fail.store(true, std::sync::atomic::Ordering::SeqCst);
    for _ in 0..5 {
        assert_eq!(client.get_status(&job_id).await.unwrap(), JobStatus::Completed);
    }

    server.stop().await;
}

#[tokio::test]
async fn unknown_job_is_not_found_end_to_end() {
    let (registry, _, _) = scripted(Duration::ZERO, false);
    let server = TestServer::start(registry).await;
    let client = server.client();

    let err = client
        .get_status(&JobId::from("00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));

    server.stop().await;
}

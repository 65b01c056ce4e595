//! Workload Client Tests
//!
//! ## Test Scopes
//! - **Scheduler**: state transitions and the legality invariant over long random runs.
//! - **Request builder**: method/path/body per command and the diagnostic fallback.
//! - **Error rendering**: cause chains.
//! - **Driver**: full loop against a real server on a loopback port.

#[cfg(test)]
mod tests {
    use crate::api::router;
    use crate::client::{
        ClientError, Command, CommandScheduler, RequestDescriptor, SchedulerState, StepOutcome,
        WorkloadDriver, build_request, render_error_chain, try_build_request,
    };
    use crate::config::ClientSettings;
    use crate::storage::{MemoryStore, RecordStore};
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use reqwest::Method;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const BASE: &str = "http://localhost:5000";

    // ============================================================
    // SCHEDULER
    // ============================================================

    #[test]
    fn test_scheduler_starts_without_known_id() {
        let scheduler = CommandScheduler::new();

        assert_eq!(scheduler.state(), SchedulerState::NoKnownId);
        assert_eq!(scheduler.eligible(), vec![Command::GetAll, Command::Add]);
    }

    #[test]
    fn test_add_unlocks_id_commands() {
        let mut scheduler = CommandScheduler::new();

        let scheduled = scheduler.apply(Command::Add);

        assert_eq!(scheduled.known_id, None);
        assert_eq!(scheduler.state(), SchedulerState::HasKnownId);
        assert_eq!(scheduler.eligible(), Command::ALL.to_vec());
    }

    #[test]
    fn test_id_commands_target_known_id_and_delete_retires_it() {
        let mut scheduler = CommandScheduler::new();
        scheduler.apply(Command::Add);
        let known = scheduler.known_id().unwrap().to_string();

        assert_eq!(scheduler.apply(Command::GetById).known_id, Some(known.clone()));
        assert_eq!(scheduler.apply(Command::SetById).known_id, Some(known.clone()));
        assert_eq!(scheduler.apply(Command::GetAll).known_id, None);
        assert_eq!(scheduler.state(), SchedulerState::HasKnownId);

        let delete = scheduler.apply(Command::DeleteById);
        assert_eq!(delete.known_id, Some(known));
        assert_eq!(scheduler.state(), SchedulerState::NoKnownId);
    }

    #[test]
    fn test_each_add_generates_a_fresh_id() {
        let mut scheduler = CommandScheduler::new();
        let mut seen = HashSet::new();

        for _ in 0..100 {
            scheduler.apply(Command::Add);
            assert!(seen.insert(scheduler.known_id().unwrap().to_string()));
        }
    }

    #[test]
    fn test_scheduler_never_emits_id_commands_without_known_id() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut scheduler = CommandScheduler::new();

            for _ in 0..500 {
                let had_known_id = scheduler.known_id().is_some();
                let scheduled = scheduler.next_command(&mut rng);

                if scheduled.command.requires_known_id() {
                    assert!(had_known_id, "{} drawn without a known id", scheduled.command);
                    assert!(scheduled.known_id.is_some());
                }
                if scheduled.command == Command::DeleteById {
                    assert_eq!(scheduler.state(), SchedulerState::NoKnownId);
                }
                if scheduled.command == Command::Add {
                    assert_eq!(scheduler.state(), SchedulerState::HasKnownId);
                }
            }
        }
    }

    #[test]
    fn test_scheduler_eventually_draws_every_command() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut scheduler = CommandScheduler::new();
        let mut drawn = HashSet::new();

        for _ in 0..1000 {
            drawn.insert(scheduler.next_command(&mut rng).command);
        }

        assert_eq!(drawn.len(), Command::ALL.len());
    }

    // ============================================================
    // REQUEST BUILDER
    // ============================================================

    #[test]
    fn test_build_requests_per_command() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let stamp = "2024-05-01T12:30:00.000Z".to_string();

        let get_all = try_build_request(Command::GetAll, None, BASE, now).unwrap();
        assert_eq!(get_all.method, Method::GET);
        assert_eq!(get_all.url, "http://localhost:5000/api/values");
        assert!(get_all.body.is_none());

        let add = try_build_request(Command::Add, None, BASE, now).unwrap();
        assert_eq!(add.method, Method::POST);
        assert_eq!(add.url, "http://localhost:5000/api/values");
        assert_eq!(add.body.unwrap().value, stamp);

        let get = try_build_request(Command::GetById, Some("abc"), BASE, now).unwrap();
        assert_eq!(get.method, Method::GET);
        assert_eq!(get.url, "http://localhost:5000/api/values/abc");

        let set = try_build_request(Command::SetById, Some("abc"), BASE, now).unwrap();
        assert_eq!(set.method, Method::PUT);
        assert_eq!(set.url, "http://localhost:5000/api/values/abc");
        assert_eq!(set.body.unwrap().value, stamp);

        let delete = try_build_request(Command::DeleteById, Some("abc"), BASE, now).unwrap();
        assert_eq!(delete.method, Method::DELETE);
        assert_eq!(delete.url, "http://localhost:5000/api/values/abc");
        assert!(delete.body.is_none());
    }

    #[test]
    fn test_build_request_trims_trailing_slash() {
        let request = build_request(Command::GetAll, None, "http://localhost:5000/");

        assert_eq!(request.url, "http://localhost:5000/api/values");
    }

    #[test]
    fn test_id_command_without_id_is_unsupported() {
        let now = Utc::now();

        let result = try_build_request(Command::SetById, None, BASE, now);
        assert!(matches!(
            result,
            Err(ClientError::UnsupportedCommand(Command::SetById))
        ));

        let result = try_build_request(Command::DeleteById, Some(""), BASE, now);
        assert!(matches!(
            result,
            Err(ClientError::UnsupportedCommand(Command::DeleteById))
        ));
    }

    #[test]
    fn test_build_request_falls_back_to_diagnostic() {
        let request = build_request(Command::GetById, None, BASE);

        assert_eq!(request, RequestDescriptor::diagnostic(BASE));
        assert_eq!(request.method, Method::OPTIONS);
        assert_eq!(request.url, BASE);
    }

    // ============================================================
    // ERROR RENDERING
    // ============================================================

    #[test]
    fn test_render_error_chain_lists_causes() {
        let error = anyhow::anyhow!("connection refused")
            .context("tcp connect error")
            .context("error sending request");

        let text = render_error_chain(&error);

        assert_eq!(
            text,
            "error sending request\n\n=== Details ===\ntcp connect error\nconnection refused"
        );
    }

    #[test]
    fn test_render_error_without_causes_has_no_details() {
        let error = anyhow::anyhow!("plain failure");

        assert_eq!(render_error_chain(&error), "plain failure");
    }

    #[tokio::test]
    async fn test_transport_error_message_is_not_repeated_in_details() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = reqwest::Client::new()
            .get(format!("http://{}/api/values", addr))
            .send()
            .await
            .unwrap_err();
        let top = source.to_string();
        let error = anyhow::Error::from(ClientError::from(source));

        let text = render_error_chain(&error);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], top);
        assert_eq!(lines.iter().filter(|line| **line == top).count(), 1, "{}", text);
    }

    // ============================================================
    // DRIVER
    // ============================================================

    fn settings(api_url: String, max_delay: Duration) -> ClientSettings {
        ClientSettings {
            api_url,
            max_delay,
            request_timeout: Duration::from_secs(5),
            log_level: tracing::Level::INFO,
        }
    }

    async fn spawn_server(store: Arc<MemoryStore>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(store)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_driver_runs_against_live_server() {
        let store = Arc::new(MemoryStore::new());
        let url = spawn_server(store.clone()).await;
        let mut driver =
            WorkloadDriver::with_rng(&settings(url, Duration::ZERO), StdRng::seed_from_u64(42))
                .unwrap();

        let stats = driver
            .run_iterations(Some(200), CancellationToken::new())
            .await;

        assert_eq!(stats.total_issued(), 200);
        assert_eq!(stats.responses, 200);
        assert_eq!(stats.error_responses, 0);
        assert_eq!(stats.transport_failures, 0);
        // Scheduler ids are advisory, so id-dependent commands never hit a real
        // record: every Add leaves exactly one record behind.
        assert_eq!(store.len().await.unwrap() as u64, stats.issued(Command::Add));
    }

    #[tokio::test]
    async fn test_driver_survives_transport_failures() {
        // Grab a free port, then close it so every connection is refused.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut driver = WorkloadDriver::with_rng(
            &settings(format!("http://{}", addr), Duration::ZERO),
            StdRng::seed_from_u64(1),
        )
        .unwrap();

        let stats = driver
            .run_iterations(Some(5), CancellationToken::new())
            .await;

        assert_eq!(stats.total_issued(), 5);
        assert_eq!(stats.transport_failures, 5);
        assert_eq!(stats.responses, 0);
    }

    #[tokio::test]
    async fn test_driver_step_reports_status() {
        let store = Arc::new(MemoryStore::new());
        let url = spawn_server(store).await;
        let mut driver =
            WorkloadDriver::with_rng(&settings(url, Duration::ZERO), StdRng::seed_from_u64(3))
                .unwrap();

        let outcome = driver.step(&CancellationToken::new()).await;

        assert_eq!(outcome, StepOutcome::Response { status: 200 });
    }

    #[tokio::test]
    async fn test_bounded_run_returns_without_trailing_delay() {
        let store = Arc::new(MemoryStore::new());
        let url = spawn_server(store).await;
        let mut driver = WorkloadDriver::with_rng(
            &settings(url, Duration::from_secs(3600)),
            StdRng::seed_from_u64(0),
        )
        .unwrap();

        // No sleep follows the last command, so the hour-long max delay never applies.
        let stats = tokio::time::timeout(
            Duration::from_secs(5),
            driver.run_iterations(Some(1), CancellationToken::new()),
        )
        .await
        .expect("bounded run should return right after its last command");

        assert_eq!(stats.total_issued(), 1);
        assert_eq!(stats.responses, 1);
    }

    #[tokio::test]
    async fn test_driver_stops_when_cancelled() {
        let store = Arc::new(MemoryStore::new());
        let url = spawn_server(store).await;
        let mut driver = WorkloadDriver::with_rng(
            &settings(url, Duration::from_secs(3600)),
            StdRng::seed_from_u64(9),
        )
        .unwrap();

        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            canceller.cancel();
        });

        // With an hour-long max delay, only cancellation can end this in time.
        let stats = tokio::time::timeout(Duration::from_secs(10), driver.run_iterations(None, cancel))
            .await
            .expect("driver should stop on cancellation");

        assert!(stats.total_issued() >= 1);
    }

    #[tokio::test]
    async fn test_driver_does_nothing_when_already_cancelled() {
        let mut driver = WorkloadDriver::with_rng(
            &settings(BASE.to_string(), Duration::ZERO),
            StdRng::seed_from_u64(0),
        )
        .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let stats = driver.run_iterations(None, cancel).await;

        assert_eq!(stats.total_issued(), 0);
        assert_eq!(driver.scheduler().state(), SchedulerState::NoKnownId);
    }
}

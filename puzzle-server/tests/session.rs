mod common;

use common::{RecordingTransport, executor, identifier};
use puzzle_server::{NO_RESULT_MESSAGE, Session, TransportError};
use puzzle_solver::{FnProblem, ProblemError, SolveError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

fn sum_lines() -> FnProblem {
    FnProblem::new("Part 1", |input, reporter| {
        let mut total = 0i64;
        for line in input.lines().filter(|line| !line.trim().is_empty()) {
            total += line
                .trim()
                .parse::<i64>()
                .map_err(|e| ProblemError::msg(format!("bad line {line:?}: {e}")))?;
        }
        reporter.solved(total.to_string());
        Ok(())
    })
}

#[tokio::test]
async fn test_sum_streams_start_then_finished() {
    let session = Session::new(identifier("Day 1", "Part 1"), sum_lines().shared(), executor());
    let mut transport = RecordingTransport::with_input("7\n4\n");

    let summary = session.run(&mut transport).await.unwrap();

    assert_eq!(transport.kinds(), ["start", "finished"]);
    let (successful, solution, error, elapsed) = transport.finished();
    assert!(successful);
    assert_eq!(solution.as_deref(), Some("11"));
    assert_eq!(error, None);
    assert!(elapsed.is_some_and(|ns| ns >= 0));
    assert!(summary.successful);
    assert_eq!(summary.delivered, 2);
    assert!(transport.closed);
    assert!(transport.sent.iter().all(|u| u.id == identifier("Day 1", "Part 1")));
}

#[tokio::test]
async fn test_error_after_progress_ends_with_failure() {
    let problem = FnProblem::new("Part 1", |_, reporter| {
        reporter.text("one");
        reporter.text("two");
        reporter.text("three");
        Err(ProblemError::msg("boom"))
    });
    let session = Session::new(identifier("Day 1", "Part 1"), problem.shared(), executor());
    let mut transport = RecordingTransport::with_input("");

    let summary = session.run(&mut transport).await.unwrap();

    assert_eq!(transport.kinds(), ["start", "text", "text", "text", "finished"]);
    assert_eq!(transport.texts(), ["one", "two", "three"]);
    let (successful, solution, error, elapsed) = transport.finished();
    assert!(!successful);
    assert_eq!(solution, None);
    assert_eq!(error.as_deref(), Some("boom"));
    assert!(elapsed.is_some());
    assert!(!summary.successful);
}

#[tokio::test]
async fn test_error_overrides_reported_success() {
    let problem = FnProblem::new("Part 1", |_, reporter| {
        reporter.solved("42");
        Err(SolveError::NoSolution("changed my mind".to_string()).into())
    });
    let session = Session::new(identifier("Day 1", "Part 1"), problem.shared(), executor());
    let mut transport = RecordingTransport::with_input("");

    session.run(&mut transport).await.unwrap();

    assert_eq!(transport.kinds(), ["start", "finished"]);
    let (successful, solution, error, _) = transport.finished();
    assert!(!successful);
    assert_eq!(solution, None);
    assert_eq!(error.as_deref(), Some("No solution: changed my mind"));
}

#[tokio::test]
async fn test_panic_becomes_failed_finished() {
    let problem = FnProblem::new("Part 1", |_, reporter| {
        reporter.text("about to fail");
        let values: Vec<u32> = Vec::new();
        if values.is_empty() {
            panic!("no values to index");
        }
        Ok(())
    });
    let session = Session::new(identifier("Day 1", "Part 1"), problem.shared(), executor());
    let mut transport = RecordingTransport::with_input("");

    session.run(&mut transport).await.unwrap();

    assert_eq!(transport.kinds(), ["start", "text", "finished"]);
    let (successful, _, error, _) = transport.finished();
    assert!(!successful);
    assert_eq!(error.as_deref(), Some("no values to index"));
}

#[tokio::test]
async fn test_early_result_is_delivered_last() {
    let problem = FnProblem::new("Part 1", |_, reporter| {
        reporter.solved("done early");
        for i in 0..50 {
            reporter.text(format!("line {i}"));
        }
        reporter.grid(["#.", ".#"]);
        Ok(())
    });
    let session = Session::new(identifier("Day 1", "Part 1"), problem.shared(), executor());
    let mut transport = RecordingTransport::with_input("");

    session.run(&mut transport).await.unwrap();

    assert_eq!(transport.sent.len(), 53);
    assert_eq!(transport.kinds()[0], "start");
    assert_eq!(transport.kinds()[51], "grid");
    let (successful, solution, _, _) = transport.finished();
    assert!(successful);
    assert_eq!(solution.as_deref(), Some("done early"));
    let expected: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
    assert_eq!(transport.texts(), expected);
}

#[tokio::test]
async fn test_concurrent_reporters_finish_last() {
    let problem = FnProblem::new("Part 1", |_, reporter| {
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let reporter = reporter.clone();
                scope.spawn(move || {
                    for i in 0..100 {
                        reporter.text(format!("{worker}:{i}"));
                    }
                    if worker == 3 {
                        reporter.solved("all done");
                    }
                });
            }
        });
        Ok(())
    });
    let session = Session::new(identifier("Day 1", "Part 1"), problem.shared(), executor());
    let mut transport = RecordingTransport::with_input("");

    session.run(&mut transport).await.unwrap();

    let kinds = transport.kinds();
    assert_eq!(kinds.len(), 802);
    assert_eq!(kinds.first(), Some(&"start"));
    assert_eq!(kinds.last(), Some(&"finished"));
    assert_eq!(kinds.iter().filter(|k| **k == "finished").count(), 1);

    // Each producer's own updates keep their order.
    let texts = transport.texts();
    for worker in 0..8 {
        let seen: Vec<u32> = texts
            .iter()
            .filter_map(|t| t.strip_prefix(&format!("{worker}:")))
            .map(|i| i.parse().unwrap())
            .collect();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn test_missing_result_is_reported_as_failure() {
    let problem = FnProblem::new("Part 1", |_, reporter| {
        reporter.text("forgot to answer");
        Ok(())
    });
    let session = Session::new(identifier("Day 1", "Part 1"), problem.shared(), executor());
    let mut transport = RecordingTransport::with_input("");

    session.run(&mut transport).await.unwrap();

    assert_eq!(transport.kinds(), ["start", "text", "finished"]);
    let (successful, _, error, _) = transport.finished();
    assert!(!successful);
    assert_eq!(error.as_deref(), Some(NO_RESULT_MESSAGE));
}

#[tokio::test]
async fn test_latest_result_wins() {
    let problem = FnProblem::new("Part 1", |_, reporter| {
        reporter.failed("first attempt failed");
        reporter.solved("second attempt");
        Ok(())
    });
    let session = Session::new(identifier("Day 1", "Part 1"), problem.shared(), executor());
    let mut transport = RecordingTransport::with_input("");

    session.run(&mut transport).await.unwrap();

    assert_eq!(transport.kinds(), ["start", "finished"]);
    let (successful, solution, _, _) = transport.finished();
    assert!(successful);
    assert_eq!(solution.as_deref(), Some("second attempt"));
}

#[tokio::test]
async fn test_elapsed_measures_solve_not_delivery() {
    let problem = FnProblem::new("Part 1", |_, reporter| {
        for i in 0..10 {
            reporter.text(i.to_string());
        }
        std::thread::sleep(Duration::from_millis(20));
        reporter.solved("ok");
        Ok(())
    });
    let session = Session::new(identifier("Day 1", "Part 1"), problem.shared(), executor());
    let mut transport = RecordingTransport::with_input("");
    transport.send_delay = Duration::from_millis(30);

    let started = Instant::now();
    let summary = session.run(&mut transport).await.unwrap();
    let wall = started.elapsed();

    assert_eq!(transport.sent.len(), 12);
    let (_, _, _, elapsed) = transport.finished();
    let elapsed = Duration::from_nanos(elapsed.unwrap() as u64);
    assert!(elapsed >= Duration::from_millis(20));
    assert!(elapsed < wall);
    assert!(wall >= Duration::from_millis(30 * 12));
    assert_eq!(summary.elapsed, elapsed);
}

#[tokio::test]
async fn test_broken_transport_still_waits_for_solver() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&finished);
    let problem = FnProblem::new("Part 1", move |_, reporter| {
        for i in 0..5 {
            reporter.text(i.to_string());
            std::thread::sleep(Duration::from_millis(5));
        }
        reporter.solved("unseen");
        flag.store(true, Ordering::SeqCst);
        Ok(())
    });
    let session = Session::new(identifier("Day 1", "Part 1"), problem.shared(), executor());
    let mut transport = RecordingTransport::with_input("");
    transport.fail_after = Some(2);

    let summary = session.run(&mut transport).await.unwrap();

    assert!(finished.load(Ordering::SeqCst));
    assert_eq!(summary.delivered, 2);
    assert_eq!(transport.sent.len(), 2);
    assert!(!transport.closed);
}

#[tokio::test]
async fn test_no_input_never_runs_solver() {
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);
    let problem = FnProblem::new("Part 1", move |_, _| {
        flag.store(true, Ordering::SeqCst);
        Ok(())
    });
    let session = Session::new(identifier("Day 1", "Part 1"), problem.shared(), executor());
    let mut transport = RecordingTransport::default();

    let result = session.run(&mut transport).await;

    assert!(matches!(result, Err(TransportError::Closed)));
    assert!(transport.sent.is_empty());
    assert!(transport.closed);
    assert!(!ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_sessions_run_independently() {
    let executor = executor();
    let slow = FnProblem::new("Part 1", |_, reporter| {
        std::thread::sleep(Duration::from_millis(50));
        reporter.solved("slow");
        Ok(())
    })
    .shared();
    let failing = FnProblem::new("Part 2", |_, _| Err(ProblemError::msg("broken"))).shared();

    let a = Session::new(identifier("Day 1", "Part 1"), slow, Arc::clone(&executor));
    let b = Session::new(identifier("Day 1", "Part 2"), failing, Arc::clone(&executor));
    let mut ta = RecordingTransport::with_input("");
    let mut tb = RecordingTransport::with_input("");

    let (ra, rb) = tokio::join!(a.run(&mut ta), b.run(&mut tb));

    assert!(ra.unwrap().successful);
    assert!(!rb.unwrap().successful);
    assert_eq!(ta.finished().1.as_deref(), Some("slow"));
    assert_eq!(tb.finished().2.as_deref(), Some("broken"));
}

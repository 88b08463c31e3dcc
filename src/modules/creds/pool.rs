use std::sync::Arc;

use colored::*;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, error};

use super::classify::{FailureMarkers, Outcome};
use super::stats::{RunContext, CLEAR_LINE};
use crate::modules::transports::Attempt;

/// Inputs shared read-only by every worker.
pub struct Sweep {
    pub attempter: Arc<dyn Attempt>,
    pub markers: FailureMarkers,
    pub usernames: Vec<String>,
    pub passwords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReport {
    pub attempted: u64,
    pub successes: u64,
}

/// Username indices owned by `worker`: `worker, worker + workers, ...` below `len`.
pub fn stride(worker: usize, workers: usize, len: usize) -> impl Iterator<Item = usize> {
    (worker..len).step_by(workers.max(1))
}

/// Run `workers` concurrent workers over the full username × password product
/// and wait for all of them.
pub async fn run_pool(ctx: Arc<RunContext>, sweep: Arc<Sweep>, workers: usize) -> PoolReport {
    let workers = workers.max(1);
    let mut tasks = FuturesUnordered::new();

    for worker in 0..workers {
        let ctx = Arc::clone(&ctx);
        let sweep = Arc::clone(&sweep);
        tasks.push(tokio::spawn(async move {
            run_worker(worker, workers, &ctx, &sweep).await;
        }));
    }

    while let Some(res) = tasks.next().await {
        if let Err(e) = res {
            error!("worker task failed: {}", e);
        }
    }

    PoolReport {
        attempted: ctx.attempted(),
        successes: ctx.successes(),
    }
}

pub(crate) async fn run_worker(worker: usize, workers: usize, ctx: &RunContext, sweep: &Sweep) {
    for index in stride(worker, workers, sweep.usernames.len()) {
        let username = &sweep.usernames[index];
        for password in &sweep.passwords {
            let success = match sweep.attempter.attempt(username, password).await {
                Ok(response) => match sweep.markers.classify(&response.output) {
                    Outcome::Success => {
                        report_success(username, password, response.show_output.then_some(response.output.as_str()));
                        true
                    }
                    Outcome::Failure => false,
                },
                Err(e) => {
                    debug!(worker, username = %username, "attempt failed: {}", e);
                    false
                }
            };
            ctx.record_attempt(success);
        }
    }
}

fn report_success(username: &str, password: &str, output: Option<&str>) {
    let line = match output {
        Some(output) => format!("[+] {}:{} -> {}", username, password, output.trim_end()),
        None => format!("[+] {}:{}", username, password),
    };
    println!("\r{}{}", CLEAR_LINE, line.green().bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttemptError;
    use crate::modules::transports::Response;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every pair; answers "welcome back" only for `valid`.
    struct Recorder {
        seen: Mutex<Vec<(String, String)>>,
        valid: (&'static str, &'static str),
        broken_user: Option<&'static str>,
    }

    impl Recorder {
        fn new(valid: (&'static str, &'static str)) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                valid,
                broken_user: None,
            }
        }
    }

    #[async_trait]
    impl Attempt for Recorder {
        async fn attempt(&self, username: &str, password: &str) -> Result<Response, AttemptError> {
            self.seen
                .lock()
                .unwrap()
                .push((username.to_string(), password.to_string()));
            tokio::task::yield_now().await;
            if self.broken_user == Some(username) {
                return Err(AttemptError::Timeout(std::time::Duration::from_secs(1)));
            }
            let output = if (username, password) == self.valid {
                "welcome back"
            } else {
                "invalid password"
            };
            Ok(Response {
                output: output.to_string(),
                show_output: false,
            })
        }
    }

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(u, p)| (u.to_string(), p.to_string())).collect()
    }

    fn sweep(recorder: Arc<Recorder>, users: &[&str], passes: &[&str]) -> Arc<Sweep> {
        Arc::new(Sweep {
            attempter: recorder,
            markers: FailureMarkers::parse("invalid").unwrap(),
            usernames: words(users),
            passwords: words(passes),
        })
    }

    #[test]
    fn stride_partitions_every_index_once() {
        for workers in 1..=9 {
            for len in 0..=25 {
                let mut seen = HashSet::new();
                for worker in 0..workers {
                    for index in stride(worker, workers, len) {
                        assert_eq!(index % workers, worker);
                        assert!(seen.insert(index), "index {} owned twice", index);
                    }
                }
                assert_eq!(seen, (0..len).collect::<HashSet<_>>());
            }
        }
    }

    #[test]
    fn idle_workers_own_nothing() {
        assert_eq!(stride(3, 5, 2).count(), 0);
    }

    #[tokio::test]
    async fn each_worker_walks_its_users_in_order() {
        let ctx = RunContext::new(4);

        let first = Arc::new(Recorder::new(("bob", "y")));
        let s = sweep(first.clone(), &["alice", "bob"], &["x", "y"]);
        run_worker(0, 2, &ctx, &s).await;
        assert_eq!(
            *first.seen.lock().unwrap(),
            pairs(&[("alice", "x"), ("alice", "y")])
        );

        let second = Arc::new(Recorder::new(("bob", "y")));
        let s = sweep(second.clone(), &["alice", "bob"], &["x", "y"]);
        run_worker(1, 2, &ctx, &s).await;
        assert_eq!(
            *second.seen.lock().unwrap(),
            pairs(&[("bob", "x"), ("bob", "y")])
        );

        assert_eq!(ctx.attempted(), 4);
        assert_eq!(ctx.successes(), 1);
    }

    #[tokio::test]
    async fn pool_covers_the_full_product_once() {
        let users: Vec<String> = (0..13).map(|i| format!("user{}", i)).collect();
        let passes: Vec<String> = (0..7).map(|i| format!("pass{}", i)).collect();
        let recorder = Arc::new(Recorder::new(("user4", "pass2")));
        let s = Arc::new(Sweep {
            attempter: recorder.clone(),
            markers: FailureMarkers::parse("invalid").unwrap(),
            usernames: users.clone(),
            passwords: passes.clone(),
        });
        let ctx = Arc::new(RunContext::new(13 * 7));

        let report = run_pool(ctx, s, 4).await;
        assert_eq!(report, PoolReport { attempted: 91, successes: 1 });

        let seen = recorder.seen.lock().unwrap();
        let unique: HashSet<_> = seen.iter().cloned().collect();
        assert_eq!(seen.len(), 91);
        assert_eq!(unique.len(), 91);

        for user in &users {
            let order: Vec<_> = seen.iter().filter(|(u, _)| u == user).map(|(_, p)| p.clone()).collect();
            assert_eq!(&order, &passes);
        }
    }

    #[tokio::test]
    async fn more_workers_than_users() {
        let recorder = Arc::new(Recorder::new(("a", "1")));
        let ctx = Arc::new(RunContext::new(2));
        let report = run_pool(ctx, sweep(recorder, &["a"], &["1", "2"]), 8).await;
        assert_eq!(report.attempted, 2);
        assert_eq!(report.successes, 1);
    }

    #[tokio::test]
    async fn empty_lists_finish_immediately() {
        let recorder = Arc::new(Recorder::new(("a", "1")));
        let ctx = Arc::new(RunContext::new(0));
        let report = run_pool(ctx.clone(), sweep(recorder.clone(), &["a", "b"], &[]), 3).await;
        assert_eq!(report.attempted, 0);

        let report = run_pool(ctx, sweep(recorder.clone(), &[], &["1"]), 3).await;
        assert_eq!(report.attempted, 0);
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    /// Panics on `doomed`, answers "invalid" for everyone else.
    struct Panicky {
        doomed: &'static str,
    }

    #[async_trait]
    impl Attempt for Panicky {
        async fn attempt(&self, username: &str, _password: &str) -> Result<Response, AttemptError> {
            tokio::task::yield_now().await;
            if username == self.doomed {
                panic!("attempt blew up for {}", username);
            }
            Ok(Response {
                output: "invalid".to_string(),
                show_output: false,
            })
        }
    }

    #[tokio::test]
    async fn panicking_worker_does_not_stop_the_others() {
        let s = Arc::new(Sweep {
            attempter: Arc::new(Panicky { doomed: "bob" }),
            markers: FailureMarkers::parse("invalid").unwrap(),
            usernames: words(&["alice", "bob", "carol", "dave"]),
            passwords: words(&["x", "y", "z"]),
        });
        let ctx = Arc::new(RunContext::new(12));

        // worker 1 owns bob and dave and dies on bob; worker 0 owns alice and carol
        let report = run_pool(ctx, s, 2).await;
        assert_eq!(report, PoolReport { attempted: 6, successes: 0 });
    }

    #[tokio::test]
    async fn transport_errors_count_as_failures() {
        let mut recorder = Recorder::new(("carol", "x"));
        recorder.broken_user = Some("bob");
        let recorder = Arc::new(recorder);
        let ctx = Arc::new(RunContext::new(6));
        let report = run_pool(ctx, sweep(recorder, &["alice", "bob", "carol"], &["x", "y"]), 2).await;
        assert_eq!(report, PoolReport { attempted: 6, successes: 1 });
    }
}

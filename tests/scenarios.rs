use std::{
    fs,
    path::Path,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Duration as StdDuration,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use iflandown::{
    run_unchecked, ActionRunner, CommandRunner, Config, DecisionEngine, LinkStateSource, Outcome,
    Phase, Result, Sampler, SharedHistory, Shutdown, Watchdog,
};

/// Two wired adapters whose carrier the test flips between ticks.
#[derive(Default)]
struct Links {
    eth0_down: AtomicBool,
    eth1_down: AtomicBool,
}

impl Links {
    fn set(&self, eth0_down: bool, eth1_down: bool) {
        self.eth0_down.store(eth0_down, Ordering::SeqCst);
        self.eth1_down.store(eth1_down, Ordering::SeqCst);
    }
}

impl LinkStateSource for Links {
    fn candidate_interfaces(&self) -> Result<Vec<String>> {
        Ok(vec!["eth0".into(), "eth1".into()])
    }

    fn is_interface_down(&self, name: &str) -> bool {
        match name {
            "eth0" => self.eth0_down.load(Ordering::SeqCst),
            "eth1" => self.eth1_down.load(Ordering::SeqCst),
            _ => true,
        }
    }
}

#[derive(Clone, Default)]
struct CountingRunner(Arc<AtomicUsize>);

impl ActionRunner for CountingRunner {
    fn run(&self, _commands: &[Vec<String>]) -> Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 22, 14, 0).unwrap()
}

fn append(log: &Path, word: &str) -> Vec<String> {
    vec![
        "sh".into(),
        "-c".into(),
        format!("echo {} >> {}", word, log.display()),
    ]
}

/// Drives sampler and engine over `minutes` simulated ticks; `down(minute)` sets both links.
fn simulate(config: Config, minutes: i64, down: impl Fn(i64) -> bool) -> Phase {
    let links = Arc::new(Links::default());
    let history = SharedHistory::new(config.period);
    let sampler = Sampler::new(links.clone(), history.clone());
    let mut engine = DecisionEngine::new(
        config,
        history,
        Box::new(CommandRunner::new()),
        start(),
        Duration::minutes(1),
    );

    let mut phase = engine.phase();
    for minute in 1..=minutes {
        let now = start() + Duration::minutes(minute) + Duration::milliseconds(250);
        links.set(down(minute), down(minute));
        sampler.tick(now);
        phase = engine.step(now + Duration::milliseconds(40));
        if phase.is_terminal() {
            break;
        }
    }
    phase
}

#[test]
fn scenario_a_all_up_keeps_running() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log");
    let config = Config {
        period: 30,
        window: 5,
        commands: vec![append(&log, "ran")],
    };

    let phase = simulate(config, 45, |_| false);
    assert_eq!(phase, Phase::Evaluating);
    assert!(!log.exists());
}

#[test]
fn scenario_b_mostly_down_runs_commands_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log");
    let config = Config {
        period: 30,
        window: 5,
        commands: vec![append(&log, "one"), append(&log, "two"), append(&log, "three")],
    };

    // Up for the first three minutes, down afterwards: at minute 31 the
    // trailing window holds 3 up and 27 down.
    let phase = simulate(config, 60, |minute| minute > 3);
    assert_eq!(phase, Phase::RemediatedOk);
    assert_eq!(fs::read_to_string(&log).unwrap(), "one\ntwo\nthree\n");
}

#[test]
fn scenario_c_second_command_failure_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log");
    let config = Config {
        period: 30,
        window: 5,
        commands: vec![append(&log, "one"), vec!["false".into()], append(&log, "three")],
    };

    let phase = simulate(config, 60, |minute| minute > 3);
    assert_eq!(phase, Phase::RemediatedFailed);
    assert_eq!(fs::read_to_string(&log).unwrap(), "one\n");
}

#[test]
fn one_live_adapter_masks_the_other() {
    let links = Links::default();
    links.set(true, false);
    let history = SharedHistory::new(3);
    let sampler = Sampler::new(Arc::new(links), history.clone());
    let sample = sampler.tick(start()).unwrap();
    assert!(!sample.is_down);
}

#[test]
fn scenario_d_nocheck_mirrors_command_result() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("log");

    let ok = Config {
        commands: vec![append(&log, "one"), append(&log, "two")],
        ..Config::default()
    };
    assert!(run_unchecked(&ok, &CommandRunner::new()).is_success());
    assert_eq!(fs::read_to_string(&log).unwrap(), "one\ntwo\n");

    let failing = Config {
        commands: vec![append(&log, "three"), vec!["false".into()], append(&log, "four")],
        ..Config::default()
    };
    let outcome = run_unchecked(&failing, &CommandRunner::new());
    assert!(matches!(outcome, Outcome::RemediationFailed(_)));
    assert!(!outcome.is_success());
    assert_eq!(fs::read_to_string(&log).unwrap(), "one\ntwo\nthree\n");
}

#[test]
fn live_watchdog_remediates_once_and_stops() {
    let links = Arc::new(Links::default());
    links.set(true, true);
    let runner = CountingRunner::default();
    let config = Config {
        period: 2,
        window: 1,
        commands: vec![vec!["true".into()]],
    };

    let outcome = Watchdog::new(config, links, Box::new(runner.clone()), Utc::now())
        .with_tick(StdDuration::from_millis(5))
        .run(Shutdown::new());

    assert!(matches!(outcome, Outcome::Remediated));
    assert_eq!(runner.0.load(Ordering::SeqCst), 1);
}

#[test]
fn live_watchdog_stops_on_shutdown_without_verdict() {
    let links = Arc::new(Links::default());
    let runner = CountingRunner::default();
    let shutdown = Shutdown::new();
    let remote = shutdown.clone();
    let stopper = thread::spawn(move || {
        thread::sleep(StdDuration::from_millis(30));
        remote.trigger();
    });

    let outcome = Watchdog::new(Config::default(), links, Box::new(runner.clone()), Utc::now())
        .with_tick(StdDuration::from_millis(10))
        .run(shutdown);
    stopper.join().unwrap();

    assert!(matches!(outcome, Outcome::Interrupted));
    assert_eq!(runner.0.load(Ordering::SeqCst), 0);
}

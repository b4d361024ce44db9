// Scripted interleavings driven through the public Coordinator API.
use parking_lot::Mutex;
use quickfuzz::{Coordinator, CoordinatorConfig, WaitBudget, WaitOutcome, POLL_INTERVAL};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn coordinator() -> Arc<Coordinator<'static>> {
    init_tracing();
    Arc::new(Coordinator::new(
        CoordinatorConfig::default().with_wait_budget(Duration::from_secs(10)),
    ))
}

#[test]
fn named_and_anonymous_threads_see_their_own_identity() {
    let c = coordinator();
    let named = c
        .spawn_named("NAME1", |c| {
            (
                c.run_if_named("NAME1", || "Hey"),
                c.run_if_named("NAME2", || "Hola"),
            )
        })
        .unwrap();
    let anon = c
        .spawn_anonymous(|c| (c.is_current_thread_named("NAME1"), c.is_current_thread_named("NAME2")))
        .unwrap();

    assert_eq!(named.join().unwrap(), (Some("Hey"), None));
    assert_eq!(anon.join().unwrap(), (false, false));
    // The main thread carries no name either.
    assert!(!c.is_current_thread_named("NAME1"));
}

#[test]
fn wait_signal_chain_enforces_order() {
    let c = coordinator();
    let log = Arc::new(Mutex::new(Vec::new()));

    let l1 = Arc::clone(&log);
    let t1 = c
        .spawn_named("TH1", move |c| {
            assert_eq!(c.wait("A"), WaitOutcome::Signalled);
            l1.lock().push('a');
            c.signal("B");
            assert_eq!(c.wait("C"), WaitOutcome::Signalled);
            l1.lock().push('c');
            c.signal("D");
        })
        .unwrap();

    let l2 = Arc::clone(&log);
    let t2 = c
        .spawn_named("TH2", move |c| {
            assert_eq!(c.wait("B"), WaitOutcome::Signalled);
            l2.lock().push('b');
            c.signal("C");
            assert_eq!(c.wait("D"), WaitOutcome::Signalled);
            l2.lock().push('d');
        })
        .unwrap();

    // Give both threads time to block before releasing the chain.
    thread::sleep(Duration::from_millis(5));
    assert!(log.lock().is_empty());
    c.signal("A");

    t1.join().unwrap();
    t2.join().unwrap();
    assert_eq!(*log.lock(), vec!['a', 'b', 'c', 'd']);
}

#[test]
fn same_body_steered_by_thread_name() {
    let c = coordinator();
    let log = Arc::new(Mutex::new(Vec::new()));

    let body = {
        let log = Arc::clone(&log);
        move |c: Arc<Coordinator<'static>>| {
            c.run_if_named("TH1", || c.signal("A"));
            c.run_if_named("TH1", || c.wait("B"));
            c.run_if_named("TH2", || c.signal("B"));
            c.run_if_named("TH2", || c.wait("A"));
            let me = if c.is_current_thread_named("TH1") { 1 } else { 2 };
            log.lock().push(me);
        }
    };

    let t1 = c.spawn_named("TH1", body.clone()).unwrap();
    let t2 = c.spawn_named("TH2", body).unwrap();
    t1.join().unwrap();
    t2.join().unwrap();

    let mut seen = log.lock().clone();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2]);
    assert!(c.is_signalled("A"));
    assert!(c.is_signalled("B"));
}

#[test]
fn manual_prepare_closes_the_startup_race() {
    let c = coordinator();
    for _ in 0..50 {
        let prepared = c.prepare();
        let ctx = Arc::clone(&c);
        let h = thread::spawn(move || {
            ctx.await_registration();
            ctx.is_current_thread_named("racer")
        });
        let id = h.thread().id();
        prepared.bind("racer", id);
        assert!(h.join().unwrap(), "thread ran before its name was bound");

        // The joined thread still holds the name until released.
        assert_eq!(c.bound_names(), 1);
        c.prepare().release(id);
        assert_eq!(c.bound_names(), 0);
    }
}

#[test]
fn wait_times_out_after_the_budget() {
    let c = coordinator();
    let budget = Duration::from_millis(5);
    let start = Instant::now();
    assert_eq!(
        c.wait_for("never", WaitBudget::from_duration(budget)),
        WaitOutcome::TimedOut
    );
    assert!(start.elapsed() >= budget);
}

#[test]
fn signal_before_wait_is_seen_immediately() {
    let c = coordinator();
    c.signal("unrelated");
    c.signal("ready");
    c.signal("ready");
    let start = Instant::now();
    assert_eq!(c.wait("ready"), WaitOutcome::Signalled);
    assert!(start.elapsed() < POLL_INTERVAL * 5);
}

#[test]
fn waiter_wakes_within_a_few_intervals_of_the_signal() {
    let c = coordinator();
    let waiter = c.spawn_anonymous(|c| c.wait("late")).unwrap();
    thread::sleep(Duration::from_millis(3));
    c.signal("late");
    assert_eq!(waiter.join().unwrap(), WaitOutcome::Signalled);
}

#[test]
fn scoped_threads_with_borrowed_names() {
    init_tracing();
    let names: Vec<String> = (0..4).map(|i| format!("worker-{i}")).collect();
    let c: Coordinator<'_> = Coordinator::new(CoordinatorConfig::default().with_capacity(8));

    thread::scope(|s| {
        let mut handles = Vec::new();
        for name in &names {
            let prepared = c.prepare();
            let c = &c;
            let h = s.spawn(move || {
                c.await_registration();
                assert!(c.is_current_thread_named(name));
                c.signal(name);
            });
            prepared.bind(name, h.thread().id());
            handles.push(h);
        }
        for h in handles {
            h.join().unwrap();
        }
    });

    for name in &names {
        assert!(c.is_signalled(name));
    }
    assert_eq!(c.bound_names(), 4);
}

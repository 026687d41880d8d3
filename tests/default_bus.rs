use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use evbus::{global, DispatchError, Dispatcher, FrameworkEvent};

// The default dispatcher is process-wide, so the whole lifecycle lives in one test.
#[tokio::test]
async fn default_bus_lifecycle() {
    global::install(
        Dispatcher::builder()
            .flush_interval(Duration::from_millis(1))
            .build(),
    )
    .unwrap();
    assert_eq!(
        global::install(Dispatcher::new()),
        Err(DispatchError::AlreadyInstalled)
    );
    assert_eq!(global::dispatcher().flush_interval(), Duration::from_millis(1));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = global::on(move |ev: FrameworkEvent| sink.lock().unwrap().push(ev));

    let typed = Arc::new(Mutex::new(Vec::new()));
    let typed_sink = Arc::clone(&typed);
    let _typed = global::on_type(0, move |ev: FrameworkEvent| typed_sink.lock().unwrap().push(ev));

    global::emit(FrameworkEvent::Started);
    global::emit(FrameworkEvent::Stopping);

    let deadline = Instant::now() + Duration::from_secs(2);
    while (seen.lock().unwrap().len() < 2 || typed.lock().unwrap().len() < 2) && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    let expected = vec![FrameworkEvent::Started, FrameworkEvent::Stopping];
    assert_eq!(*seen.lock().unwrap(), expected);
    assert_eq!(*typed.lock().unwrap(), expected);
    assert_eq!(global::dispatcher().subscriber_count(0), 2);

    sub.cancel();
    assert_eq!(global::dispatcher().subscriber_count(0), 1);

    assert_eq!(global::close(), Ok(()));
    assert_eq!(global::close(), Err(DispatchError::Closed));
    assert!(global::dispatcher().is_closed());
}

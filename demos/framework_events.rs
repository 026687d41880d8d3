//! # Framework lifecycle events
//!
//! Shows the default bus carrying framework lifecycle notifications next to a
//! dedicated dispatcher for application events.
//!
//! - `LogWriter` traces every framework event.
//! - A custom handler counts orders on its own dispatcher.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example framework_events --features logging
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use evbus::{global, Config, Dispatcher, Event, EventType, FrameworkEvent, Handler, LogWriter};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct OrderPlaced {
    amount_cents: u64,
}

impl Event for OrderPlaced {
    const TYPE: EventType = 0x100;
}

struct Revenue {
    total: Arc<AtomicU64>,
}

#[async_trait]
impl Handler<OrderPlaced> for Revenue {
    async fn on_event(&self, ev: OrderPlaced) {
        self.total.fetch_add(ev.amount_cents, Ordering::Relaxed);
    }

    fn name(&self) -> &'static str {
        "revenue"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = Config::from_env()?;
    global::install(Dispatcher::with_config(cfg.clone()))?;
    let lifecycle = global::on::<FrameworkEvent, _>(LogWriter);

    let orders = Dispatcher::with_config(cfg);
    let total = Arc::new(AtomicU64::new(0));
    let _revenue = orders.subscribe::<OrderPlaced, _>(Revenue {
        total: Arc::clone(&total),
    });

    global::emit(FrameworkEvent::Started);
    for amount_cents in [1_250, 499, 10_000] {
        orders.publish(OrderPlaced { amount_cents });
    }

    tokio::time::sleep(Duration::from_millis(20)).await;
    println!("revenue: {} cents", total.load(Ordering::Relaxed));

    global::emit(FrameworkEvent::Stopping);
    tokio::time::sleep(Duration::from_millis(20)).await;

    lifecycle.cancel();
    orders.close()?;
    global::close()?;
    Ok(())
}

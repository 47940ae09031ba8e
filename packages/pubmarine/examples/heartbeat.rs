//! Heartbeat demo: a server publishes a beat, a client displays it.
//!
//! The client is dropped half-way through without unsubscribing; the
//! dispatcher notices on the next publish and stops scheduling it.
//!
//! ```text
//! RUST_LOG=pubmarine=trace cargo run -p pubmarine --example heartbeat
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use pubmarine::{Dispatcher, LocalSpawner, WeakRef};
use tokio::task::LocalSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const BEATS: u32 = 6;
const CLIENT_LEAVES_AFTER: u32 = 3;

struct Client {
    name: &'static str,
}

impl Client {
    fn new(dispatcher: &Dispatcher<u32>, name: &'static str) -> Result<Rc<Self>> {
        let client = Rc::new(Self { name });
        dispatcher.subscribe("server_msg", WeakRef::method(&client, Client::display))?;
        Ok(client)
    }

    fn display(&self, beat: u32) {
        tracing::info!(client = self.name, beat, "received heartbeat");
    }
}

struct Server {
    dispatcher: Rc<Dispatcher<u32>>,
    beats: Cell<u32>,
}

impl Server {
    fn new(dispatcher: Rc<Dispatcher<u32>>) -> Self {
        Self {
            dispatcher,
            beats: Cell::new(0),
        }
    }

    fn heartbeat(&self) -> Result<u32> {
        let beat = self.beats.get();
        self.dispatcher.publish("server_msg", beat)?;
        self.beats.set(beat + 1);
        Ok(beat)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pubmarine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let local = LocalSet::new();
    local
        .run_until(async {
            let dispatcher = Rc::new(Dispatcher::with_events(
                LocalSpawner::new(),
                ["server_msg"],
            ));
            let server = Server::new(Rc::clone(&dispatcher));
            let mut client = Some(Client::new(&dispatcher, "client")?);
            let _observer = Client::new(&dispatcher, "observer")?;

            for _ in 0..BEATS {
                let beat = server.heartbeat()?;
                tokio::time::sleep(Duration::from_millis(100)).await;

                if beat + 1 == CLIENT_LEAVES_AFTER {
                    if let Some(client) = client.take() {
                        tracing::info!(client = client.name, "client leaving");
                    }
                }
            }

            tracing::info!(
                subscriptions = dispatcher.subscription_count(),
                "server done"
            );
            Ok::<(), anyhow::Error>(())
        })
        .await
}

//! Terminal client for the FinanceGURU conversation core.
//!
//! Stands in for the excluded rendering layer: wires configuration, backend
//! client, session store, connectivity monitor and dispatcher together and
//! drives them from stdin.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::RwLock;
use tracing::info;

use financeguru_core::advisor::FAQ_CATALOG;
use financeguru_core::{
    BackendClient, Config, ConnectivityMonitor, Dispatcher, DispatcherOptions, Message,
    SessionStore, StatusCell,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("financeguru_core=info,financeguru=info")
            }),
        )
        .init();

    let config = Config::from_env();
    info!(api_url = %config.api_url, "FinanceGURU starting");

    let backend: Arc<dyn financeguru_core::ChatBackend> = Arc::new(BackendClient::new(
        config.api_url.clone(),
        config.probe_timeout,
        config.chat_timeout,
    )?);
    let status = Arc::new(StatusCell::default());
    let store = Arc::new(RwLock::new(SessionStore::open(&config.state_path)));

    let monitor = ConnectivityMonitor::new(
        Arc::clone(&backend),
        Arc::clone(&status),
        config.probe_timeout,
    );
    monitor.start(config.probe_interval);

    let dispatcher = Dispatcher::new(
        backend,
        Arc::clone(&status),
        Arc::clone(&store),
        DispatcherOptions {
            chat_timeout: config.chat_timeout,
            fallback_delay: config.fallback_delay,
            ..DispatcherOptions::default()
        },
    );

    {
        let mut store = store.write().await;
        if !store.session().welcome_shown {
            println!("Welcome to FinanceGURU - your personal AI financial advisor.");
            store.mark_welcome_shown();
        }
        for message in &store.session().history {
            print_message(message);
        }
    }
    println!("Commands: /status /clear /faq [n] /sidebar /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();

        match input {
            "/quit" | "/exit" => break,
            "/status" => {
                let state = monitor.probe().await;
                println!("[backend: {}]", state);
                continue;
            }
            "/clear" => {
                let mut store = store.write().await;
                store.clear_history();
                if let Some(greeting) = store.session().history.last() {
                    print_message(greeting);
                }
                continue;
            }
            "/faq" => {
                for (i, entry) in FAQ_CATALOG.iter().enumerate() {
                    println!("  {}. {}", i + 1, entry.question);
                }
                continue;
            }
            "/sidebar" => {
                let mut store = store.write().await;
                let open = !store.session().sidebar_open;
                store.set_sidebar_open(open);
                println!("[sidebar: {}]", if open { "open" } else { "hidden" });
                continue;
            }
            _ => {}
        }

        // "/faq 3" sends the catalog question as if it were typed.
        let text = if let Some(n) = input.strip_prefix("/faq ") {
            let entry = n
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| FAQ_CATALOG.get(i));
            match entry {
                Some(entry) => entry.question.to_string(),
                None => {
                    println!("No such FAQ entry");
                    continue;
                }
            }
        } else {
            input.to_string()
        };

        if let Some(reply) = dispatcher.send(&text).await {
            print_message(&reply);
        }
    }

    monitor.shutdown();
    info!("FinanceGURU shutting down");
    Ok(())
}

fn print_message(message: &Message) {
    let who = match message.sender {
        financeguru_core::Sender::User => "you",
        financeguru_core::Sender::Bot => "guru",
    };

    match message.source {
        Some(source) => println!("{} [{}]> {}", who, source, message.text),
        None => println!("{}> {}", who, message.text),
    }
}

use std::sync::Arc;

use event_pipeline::middleware::logging::LoggingMiddleware;
use event_pipeline::middleware::metrics::MetricsMiddleware;
use event_pipeline::{
    Cancellable, ChainRegistry, EventBus, Event, HandlerResult, Result, cancellable_event,
};
use tracing_subscriber::EnvFilter;

// ============================================================================
// EVENTS
// ============================================================================

struct PlayerJoin {
    player: String,
    join_message: Option<String>,
    inbox: Vec<String>,
}

impl PlayerJoin {
    fn new(player: &str) -> Self {
        Self {
            player: player.to_string(),
            join_message: Some(format!("{player} joined the game")),
            inbox: Vec::new(),
        }
    }
}

impl Event for PlayerJoin {}

struct GameModeChange {
    inbox: Vec<String>,
}

impl Event for GameModeChange {}

struct CommandPreprocess {
    message: String,
    inbox: Vec<String>,
    cancelled: bool,
}

impl CommandPreprocess {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            inbox: Vec::new(),
            cancelled: false,
        }
    }
}

impl Cancellable for CommandPreprocess {
    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

cancellable_event!(CommandPreprocess);

// ============================================================================
// WIRING
// ============================================================================

fn wire(registry: &ChainRegistry, metrics: &MetricsMiddleware) -> Result<()> {
    registry
        .chain::<PlayerJoin>()?
        .write()
        .add_first("block_join_message", |event: &mut PlayerJoin| -> HandlerResult {
            event.join_message = None;
            Ok(())
        })?
        .add_before("block_join_message", "send_greeting", |event: &mut PlayerJoin| -> HandlerResult {
            event.inbox.push("Hello!".to_string());
            event.inbox.push("Be sure to check out our website".to_string());
            Ok(())
        })?;

    registry
        .chain::<GameModeChange>()?
        .write()
        .add_first("send_message", |event: &mut GameModeChange| -> HandlerResult {
            event.inbox.push("You changed gamemode".to_string());
            Ok(())
        })?;

    let commands = registry.chain::<CommandPreprocess>()?;
    let mut chain = commands.write();
    chain
        .use_middleware(metrics.clone())
        .use_middleware(LoggingMiddleware::info());
    chain
        .add_first("block_plugin_commands", |event: &mut CommandPreprocess| -> HandlerResult {
            let command = event.message.split(' ').next().unwrap_or_default();
            if command.contains(':') {
                event.set_cancelled(true);
                event.inbox.push("Executing commands with plugin:command is blocked!".to_string());
            }
            Ok(())
        })?
        .add_after("block_plugin_commands", "inform_command", |event: &mut CommandPreprocess| -> HandlerResult {
            event.inbox.push(format!("Command: {}", event.message));
            Ok(())
        })?;

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bus = Arc::new(EventBus::new());
    let registry = ChainRegistry::new(bus.clone());
    let metrics = MetricsMiddleware::new();

    wire(&registry, &metrics)?;

    println!("\n{}", "=".repeat(70));
    println!("Registered chains");
    println!("{}", "=".repeat(70));
    for category in registry.categories() {
        println!("  {category}");
    }

    let mut join = PlayerJoin::new("alex");
    bus.publish(&mut join)?;
    println!("\n[{}] join message: {:?}", join.player, join.join_message);
    for line in &join.inbox {
        println!("  -> {line}");
    }

    let mut change = GameModeChange { inbox: Vec::new() };
    bus.publish(&mut change)?;
    println!("\n[gamemode] {:?}", change.inbox);

    for message in ["/spawn", "/essentials:home base", "/tpa alex"] {
        let mut event = CommandPreprocess::new(message);
        let outcomes = bus.publish(&mut event)?;
        for outcome in outcomes {
            println!(
                "\n{message}: {} after {} handler(s){}",
                outcome.status,
                outcome.invoked,
                outcome
                    .suppressed_by
                    .map(|node| format!(" (suppressed by {node})"))
                    .unwrap_or_default()
            );
        }
        for line in &event.inbox {
            println!("  -> {line}");
        }
    }

    metrics.log_summary();
    Ok(())
}

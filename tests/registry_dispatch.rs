//! Registry wiring, host delivery and concurrent dispatch.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use event_pipeline::{
    Cancellable, Category, ChainError, ChainRegistry, DispatchStatus, Event, EventBus,
    HandlerResult,
};

#[derive(Default)]
struct PlayerJoin {
    join_message: Option<String>,
    sent: Vec<String>,
}

impl Event for PlayerJoin {}

#[derive(Default)]
struct CommandPreprocess {
    message: String,
    sent: Vec<String>,
    cancelled: bool,
}

impl CommandPreprocess {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            ..Self::default()
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

event_pipeline::cancellable_event!(CommandPreprocess);

fn setup() -> (Arc<EventBus>, ChainRegistry) {
    let bus = Arc::new(EventBus::new());
    let registry = ChainRegistry::new(bus.clone());
    (bus, registry)
}

#[test]
fn join_pipeline_runs_greeting_before_blocking() {
    let (bus, registry) = setup();

    registry
        .chain::<PlayerJoin>()
        .unwrap()
        .write()
        .add_first("block_join_message", |event: &mut PlayerJoin| -> HandlerResult {
            event.join_message = None;
            Ok(())
        })
        .unwrap()
        .add_before("block_join_message", "send_greeting", |event: &mut PlayerJoin| -> HandlerResult {
            event.sent.push(format!("Hello! ({:?})", event.join_message));
            Ok(())
        })
        .unwrap();

    let mut event = PlayerJoin {
        join_message: Some("alex joined".to_string()),
        ..PlayerJoin::default()
    };
    let outcomes = bus.publish(&mut event).unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].invoked, 2);
    assert_eq!(event.join_message, None);
    assert_eq!(event.sent, ["Hello! (Some(\"alex joined\"))"]);
}

#[test]
fn blocked_commands_skip_later_handlers() {
    let (bus, registry) = setup();

    registry
        .chain::<CommandPreprocess>()
        .unwrap()
        .write()
        .add_first("block_plugin_commands", |event: &mut CommandPreprocess| -> HandlerResult {
            let command = event.message.split(' ').next().unwrap_or_default();
            if command.contains(':') {
                event.set_cancelled(true);
                event.sent.push("blocked".to_string());
            }
            Ok(())
        })
        .unwrap()
        .add_after("block_plugin_commands", "inform_command", |event: &mut CommandPreprocess| -> HandlerResult {
            event.sent.push(format!("Command: {}", event.message));
            Ok(())
        })
        .unwrap();

    let mut blocked = CommandPreprocess::new("/plugin:reload now");
    let outcomes = bus.publish(&mut blocked).unwrap();
    assert_eq!(outcomes[0].status, DispatchStatus::Suppressed);
    assert_eq!(outcomes[0].suppressed_by.as_deref(), Some("block_plugin_commands"));
    assert_eq!(blocked.sent, ["blocked"]);

    let mut allowed = CommandPreprocess::new("/spawn");
    let outcomes = bus.publish(&mut allowed).unwrap();
    assert_eq!(outcomes[0].status, DispatchStatus::Completed);
    assert_eq!(allowed.sent, ["Command: /spawn"]);
}

#[test]
fn host_delivering_the_wrong_type_is_rejected() {
    let (bus, registry) = setup();
    registry.chain::<PlayerJoin>().unwrap();

    let mut wrong = CommandPreprocess::new("/spawn");
    let err = bus
        .deliver(&Category::of::<PlayerJoin>(), &mut wrong)
        .unwrap_err();
    assert!(matches!(err, ChainError::TypeMismatch { .. }));
    assert!(err.to_string().contains("is not an instance of"));
}

#[test]
fn handlers_may_dispatch_into_their_own_chain() {
    let (_bus, registry) = setup();
    let chain = registry.chain::<PlayerJoin>().unwrap();
    let reentrant = chain.clone();

    chain
        .write()
        .add_last("echo", move |event: &mut PlayerJoin| -> HandlerResult {
            event.sent.push("echo".to_string());
            if event.sent.len() == 1 {
                let mut nested = PlayerJoin::default();
                nested.sent.push("nested".to_string());
                reentrant.dispatch(&mut nested)?;
                event.sent.extend(nested.sent);
            }
            Ok(())
        })
        .unwrap();

    let mut event = PlayerJoin::default();
    chain.dispatch(&mut event).unwrap();
    assert_eq!(event.sent, ["echo", "nested", "echo"]);
}

#[test]
fn concurrent_dispatch_sees_whole_topologies() {
    let (_bus, registry) = setup();
    let chain = registry.chain::<CommandPreprocess>().unwrap();
    let invocations = Arc::new(AtomicUsize::new(0));

    for name in ["first", "last"] {
        let invocations = Arc::clone(&invocations);
        chain
            .write()
            .add_last(name, move |event: &mut CommandPreprocess| -> HandlerResult {
                invocations.fetch_add(1, Ordering::Relaxed);
                event.sent.push(name.to_string());
                Ok(())
            })
            .unwrap();
    }

    thread::scope(|scope| {
        for _ in 0..4 {
            let chain = registry.chain::<CommandPreprocess>().unwrap();
            scope.spawn(move || {
                for _ in 0..200 {
                    let mut event = CommandPreprocess::new("/spawn");
                    let outcome = chain.dispatch(&mut event).unwrap();
                    assert!(outcome.invoked == 2 || outcome.invoked == 3);
                    assert_eq!(event.sent.first().map(String::as_str), Some("first"));
                    assert_eq!(event.sent.last().map(String::as_str), Some("last"));
                }
            });
        }

        for _ in 0..100 {
            chain
                .write()
                .add_after("first", "flicker", |event: &mut CommandPreprocess| -> HandlerResult {
                    event.sent.push("flicker".to_string());
                    Ok(())
                })
                .unwrap();
            chain.write().remove("flicker").unwrap();
        }
    });

    assert_eq!(chain.read().names(), ["first", "last"]);
    assert_eq!(invocations.load(Ordering::Relaxed), 4 * 200 * 2);
    assert_eq!(registry.len(), 1);
}

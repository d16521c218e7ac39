use std::{
    collections::HashSet,
    sync::{atomic::{AtomicUsize, Ordering}, Arc},
    thread,
};

use carelink::relay::{
    Binding, ConnectionId, ConnectionRegistry, Message, MessageRouter, Relay, RelayStats, Role, RouteOutcome, Transport,
};
use parking_lot::Mutex;
use rand::Rng;
use serde_json::{json, Value};

#[derive(Default)]
struct Recorder {
    sent: Mutex<Vec<(ConnectionId, String, Value)>>,
}

impl Transport for Recorder {
    fn deliver(&self, connection: ConnectionId, event: &str, payload: Value) {
        self.sent.lock().push((connection, event.to_owned(), payload));
    }
}

#[derive(Default)]
struct Counter(AtomicUsize);

impl Transport for Counter {
    fn deliver(&self, _connection: ConnectionId, _event: &str, _payload: Value) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn unbind_clears_lookup() {
    let registry = ConnectionRegistry::new();
    let c1 = ConnectionId::new();
    registry.bind(c1, Role::Seeker, "s1");
    registry.unbind(c1);
    assert_eq!(registry.lookup(Role::Seeker, "s1"), None);
}

#[test]
fn reconnect_race_keeps_newest_connection() {
    let registry = ConnectionRegistry::new();
    let (c1, c2) = (ConnectionId::new(), ConnectionId::new());
    registry.bind(c1, Role::Seeker, "s1");
    registry.bind(c2, Role::Seeker, "s1");
    registry.unbind(c1);
    assert_eq!(registry.lookup(Role::Seeker, "s1"), Some(c2));

    registry.unbind(c2);
    assert_eq!(registry.lookup(Role::Seeker, "s1"), None);
}

#[test]
fn chat_reaches_bound_provider_once() {
    let registry = Arc::new(ConnectionRegistry::new());
    let recorder = Arc::new(Recorder::default());
    let router = MessageRouter::new(registry.clone(), recorder.clone());

    let c3 = ConnectionId::new();
    registry.bind(c3, Role::Provider, "p7");
    let outcome = router.route(&Message::chat("s1", "Ana", Binding::new(Role::Provider, "p7"), "Hello"));

    assert_eq!(outcome, RouteOutcome::Delivered);
    let sent = recorder.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0],
        (
            c3,
            "message-received".to_owned(),
            json!({"senderIdentity": "s1", "senderDisplayName": "Ana", "text": "Hello", "kind": "Chat"})
        )
    );
}

#[test]
fn chat_to_offline_identity_is_dropped() {
    let recorder = Arc::new(Recorder::default());
    let relay = Relay::new(recorder.clone());
    let outcome = relay.dispatch(
        ConnectionId::new(),
        carelink::relay::InboundEvent::Chat(Message::chat("s1", "Ana", Binding::new(Role::Provider, "ghost"), "Hello")),
    );
    assert_eq!(outcome, Some(RouteOutcome::Dropped));
    assert!(recorder.sent.lock().is_empty());
}

#[test]
fn stats_count_distinct_identities() {
    let registry = ConnectionRegistry::new();
    for i in 0..4 {
        registry.bind(ConnectionId::new(), Role::Seeker, format!("s{i}"));
    }
    for i in 0..3 {
        registry.bind(ConnectionId::new(), Role::Provider, format!("p{i}"));
    }
    // reconnect of an already bound seeker does not add one
    registry.bind(ConnectionId::new(), Role::Seeker, "s0");

    assert_eq!(registry.stats(), RelayStats { seeker_count: 4, provider_count: 3 });
}

fn assert_consistent(registry: &ConnectionRegistry) {
    let bindings = registry.bindings();
    let mut identities = HashSet::new();
    let (mut seekers, mut providers) = (0, 0);

    for (connection, binding) in &bindings {
        assert!(identities.insert(binding.clone()), "{binding} bound twice");
        assert_eq!(registry.lookup(binding.role, &binding.identity), Some(*connection));
        assert_eq!(registry.binding_of(*connection).as_ref(), Some(binding));
        match binding.role {
            Role::Seeker => seekers += 1,
            Role::Provider => providers += 1,
        }
    }

    assert_eq!(registry.stats(), RelayStats { seeker_count: seekers, provider_count: providers });
}

#[test]
fn concurrent_bind_unbind_route_stay_consistent() {
    const THREADS: usize = 8;
    const OPS: usize = 5_000;

    let registry = Arc::new(ConnectionRegistry::new());
    let counter = Arc::new(Counter::default());
    let router = MessageRouter::new(registry.clone(), counter.clone());
    let connections: Vec<ConnectionId> = (0..32).map(|_| ConnectionId::new()).collect();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let registry = &registry;
            let router = &router;
            let connections = &connections;
            scope.spawn(move || {
                let mut rng = rand::rng();
                for _ in 0..OPS {
                    let connection = connections[rng.random_range(0..connections.len())];
                    let role = if rng.random_bool(0.5) { Role::Seeker } else { Role::Provider };
                    let identity = format!("id{}", rng.random_range(0..8));
                    match rng.random_range(0..3) {
                        0 => {
                            registry.bind(connection, role, identity);
                        }
                        1 => {
                            registry.unbind(connection);
                        }
                        _ => {
                            router.route(&Message::chat("x", "X", Binding::new(role, identity), "ping"));
                        }
                    }
                }
            });
        }
    });

    assert_consistent(&registry);
}

#[test]
fn concurrent_stale_close_never_evicts_relogin() {
    for _ in 0..500 {
        let registry = Arc::new(ConnectionRegistry::new());
        let (c1, c2) = (ConnectionId::new(), ConnectionId::new());
        registry.bind(c1, Role::Seeker, "s1");

        thread::scope(|scope| {
            scope.spawn(|| registry.bind(c2, Role::Seeker, "s1"));
            scope.spawn(|| registry.unbind(c1));
        });

        assert_eq!(registry.lookup(Role::Seeker, "s1"), Some(c2));
        assert_consistent(&registry);
    }
}

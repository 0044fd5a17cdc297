use std::sync::Arc;

use serde_json::json;
use typed_storage::cookies::{jar_handle, CookieOptions, DefaultCookieJar, TypedCookies};
use typed_storage::storage::{InMemoryLocalStore, InMemorySessionStore, StorageService};
use typed_storage::{CallableTable, StorageConfig, Value};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut callables = CallableTable::new();
    let shout = callables.register("shout", |args: &[Value]| match args.first() {
        Some(Value::String(s)) => Value::String(s.to_uppercase()),
        _ => Value::String(String::new()),
    });

    let service = StorageService::with_config(
        Arc::new(InMemoryLocalStore::new()),
        Arc::new(InMemorySessionStore::new()),
        callables,
        StorageConfig::default(),
    );
    let mut events = service.subscribe();

    let session = service.storage(false);
    session.set("count", 5)?;
    session.set("user", json!({"name": "ada", "roles": ["admin"]}))?;
    session.set("shout", shout)?;

    println!("count  = {:?}", session.get("count"));
    println!("user   = {:?}", session.get("user"));
    if let Some(Value::Function(f)) = session.get("shout") {
        println!("shout  = {:?}", f.call(&[Value::from("hello")]));
    }
    println!("length = {:?}", session.get("length"));

    session.remove("count")?;
    println!("after remove: {} entries", session.get_all().len());

    while let Ok(ev) = events.try_recv() {
        println!("event: {:?} {:?} {:?} -> {:?}", ev.scope, ev.key, ev.old_value, ev.new_value);
    }

    let cookies = TypedCookies::new(jar_handle(DefaultCookieJar::new()));
    cookies.set("theme", "dark")?;
    cookies.set_with("visits", 3, true)?;
    cookies.set_with("beta", true, CookieOptions::new().with_path("/").with_secure(true))?;

    for (k, v) in &cookies.get_all() {
        println!("cookie {k} = {v:?}");
    }

    Ok(())
}

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use app_integrity::{global_engine, AppInstallMetadata, Effect, InMemoryRuleStore, RuleStore};

static INITS: AtomicUsize = AtomicUsize::new(0);

fn make_store() -> Box<dyn RuleStore + Send + Sync> {
    INITS.fetch_add(1, Ordering::SeqCst);
    Box::new(InMemoryRuleStore::default())
}

// Single test: the engine is process-wide.
#[test]
fn test_global_engine_created_once_under_concurrent_first_use() {
    let addrs: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|_| s.spawn(|| global_engine(make_store) as *const _ as usize))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(INITS.load(Ordering::SeqCst), 1);
    assert!(addrs.windows(2).all(|w| w[0] == w[1]));

    let engine = global_engine(make_store);
    assert_eq!(INITS.load(Ordering::SeqCst), 1);

    let subject = AppInstallMetadata::builder().package_name("pkg").build();
    assert_eq!(engine.evaluate(&subject, &BTreeMap::new()).effect(), Effect::Allow);
}

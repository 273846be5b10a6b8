use std::sync::Arc;

use anyhow::Result;
use watcher_core::{DatasourceConfig, DatasourceType, EntryId, TriggerEngine, WatcherError};
use watcher_dispatcher::{PollingContext, SchedulerRegistry, SchedulerStatus, Watcher};
use watcher_infrastructure::RecordFetcher;
use watcher_testing_utils::{
    datasource_registry, sqlite_datasource, ManualTriggerEngine, MemorySink,
    WatcherDefinitionBuilder, TEST_TIMEOUT,
};

struct Fixture {
    engine: ManualTriggerEngine,
    registry: SchedulerRegistry,
    sink: MemorySink,
    context: PollingContext,
}

fn fixture(datasources: Vec<DatasourceConfig>) -> Fixture {
    let engine = ManualTriggerEngine::new();
    let factory_engine = engine.clone();
    let registry = SchedulerRegistry::new(Box::new(move || {
        Arc::new(factory_engine.clone()) as Arc<dyn TriggerEngine>
    }));
    let sink = MemorySink::new();
    let context = PollingContext::new(
        datasource_registry(datasources),
        Arc::new(sink.clone()),
        RecordFetcher::new(TEST_TIMEOUT),
    );
    Fixture {
        engine,
        registry,
        sink,
        context,
    }
}

fn oracle_datasource(code: &str) -> DatasourceConfig {
    DatasourceConfig {
        code: code.to_string(),
        kind: DatasourceType::Oracle,
        server: "10.0.0.8".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_enable_is_idempotent() -> Result<()> {
    let watcher = Watcher::new(WatcherDefinitionBuilder::new("Stock").build());
    assert!(!watcher.is_enabled().await);

    watcher.enable().await?;
    watcher.enable().await?;
    assert!(watcher.is_enabled().await);
    Ok(())
}

#[tokio::test]
async fn test_enable_requires_cron_expression() {
    let watcher = Watcher::new(WatcherDefinitionBuilder::new("Stock").with_cron("").build());
    let result = watcher.enable().await;
    assert!(matches!(result, Err(WatcherError::InvalidCronExpression { .. })));
    assert!(!watcher.is_enabled().await);
}

#[tokio::test]
async fn test_start_without_scheduler_is_unavailable() {
    let f = fixture(vec![]);
    let watcher = Watcher::new(WatcherDefinitionBuilder::new("Stock").enabled().build());

    let result = watcher.start(&f.registry, &f.context).await;
    assert!(matches!(result, Err(WatcherError::SchedulerUnavailable)));
}

#[tokio::test]
async fn test_start_disabled_watcher_fails() {
    let f = fixture(vec![]);
    f.registry.init().await;
    let watcher = Watcher::new(WatcherDefinitionBuilder::new("Stock").build());

    let result = watcher.start(&f.registry, &f.context).await;
    assert!(matches!(result, Err(WatcherError::WatcherDisabled { .. })));
    assert!(f.engine.is_empty());
}

#[tokio::test]
async fn test_start_invalid_cron_fails() {
    let f = fixture(vec![]);
    f.registry.init().await;
    let watcher = Watcher::new(
        WatcherDefinitionBuilder::new("Stock")
            .with_cron("bad")
            .enabled()
            .build(),
    );

    let result = watcher.start(&f.registry, &f.context).await;
    assert!(matches!(result, Err(WatcherError::InvalidCronExpression { .. })));
    assert_eq!(watcher.entry_id().await, None);
}

#[tokio::test]
async fn test_start_stop_round_trip() -> Result<()> {
    let f = fixture(vec![]);
    f.registry.init().await;
    let watcher = Watcher::new(WatcherDefinitionBuilder::new("Stock").enabled().build());

    let first = watcher.start(&f.registry, &f.context).await?;
    let again = watcher.start(&f.registry, &f.context).await?;
    assert_eq!(first, again);
    assert_eq!(f.engine.len(), 1);
    assert_eq!(f.engine.cron_of(first).as_deref(), Some("0 */5 *"));

    watcher.stop(&f.registry).await;
    watcher.stop(&f.registry).await;
    assert_eq!(watcher.entry_id().await, None);
    assert!(f.engine.is_empty());

    let restarted = watcher.start(&f.registry, &f.context).await?;
    assert_ne!(restarted, EntryId(0));
    assert_ne!(restarted, first);
    assert!(watcher.is_enabled().await);
    assert_eq!(f.engine.ids(), vec![restarted]);
    Ok(())
}

#[tokio::test]
async fn test_disable_stops_and_clears_enabled() -> Result<()> {
    let f = fixture(vec![]);
    f.registry.init().await;
    let watcher = Watcher::new(WatcherDefinitionBuilder::new("Stock").enabled().build());
    watcher.start(&f.registry, &f.context).await?;

    watcher.disable(&f.registry).await;
    assert!(!watcher.is_enabled().await);
    assert_eq!(watcher.entry_id().await, None);
    assert!(f.engine.is_empty());

    let snapshot = watcher.snapshot().await;
    assert!(!snapshot.definition.enabled);
    assert_eq!(snapshot.entry_id, 0);
    Ok(())
}

#[tokio::test]
async fn test_poll_fetches_records_and_updates_statistics() -> Result<()> {
    let f = fixture(vec![sqlite_datasource("local")]);
    f.registry.init().await;
    let watcher = Watcher::new(
        WatcherDefinitionBuilder::new("Stock")
            .with_sources(&["local", "missing"])
            .with_get_expired(r#"SELECT 3 AS Expire1Day, 'east' AS "Extend.Region""#)
            .enabled()
            .build(),
    );
    let id = watcher.start(&f.registry, &f.context).await?;

    assert!(f.engine.fire(id).await);
    assert!(f.engine.fire(id).await);

    let stats = watcher.stats().await;
    assert_eq!(stats.run_count, 2);
    assert!(f.sink.wait_for(2).await);

    let documents = f.sink.documents_in("stock");
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["Datasource"], "local");
    assert_eq!(documents[0]["Expire1Day"], 3);
    assert_eq!(documents[0]["Extend"]["Region"], "east");
    assert_eq!(documents[0]["WatcherConfig"]["App"], "Stock");

    let entry = watcher.entry(&f.registry).await;
    assert_eq!(entry.app, "Stock");
    assert_eq!(entry.entry_id, id.0);
    assert!(entry.prev_fire_time.is_some());
    Ok(())
}

#[tokio::test]
async fn test_poll_failure_is_logged_and_skipped() -> Result<()> {
    let f = fixture(vec![oracle_datasource("erp"), sqlite_datasource("local")]);
    f.registry.init().await;
    let watcher = Watcher::new(
        WatcherDefinitionBuilder::new("Stock")
            .with_sources(&["erp", "local"])
            .with_get_expired("SELECT 1 AS Expire1Day")
            .enabled()
            .build(),
    );
    let id = watcher.start(&f.registry, &f.context).await?;

    f.engine.fire(id).await;

    assert_eq!(watcher.stats().await.run_count, 1);
    assert!(f.sink.wait_for(2).await);
    let errors = f.sink.documents_in("logs");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["Level"], "Error");
    assert_eq!(errors[0]["Extend"]["Datasource"], "erp");
    assert_eq!(f.sink.documents_in("stock").len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_stop_resets_bound_datasources() -> Result<()> {
    let f = fixture(vec![sqlite_datasource("local")]);
    f.registry.init().await;
    let watcher = Watcher::new(
        WatcherDefinitionBuilder::new("Stock")
            .with_sources(&["local"])
            .enabled()
            .build(),
    );
    let id = watcher.start(&f.registry, &f.context).await?;
    f.engine.fire(id).await;

    let datasource = f.context.datasources.get("local")?;
    assert!(datasource.is_connected().await);

    watcher.stop(&f.registry).await;
    assert!(!datasource.is_connected().await);
    Ok(())
}

#[tokio::test]
async fn test_unregistered_entry_projection() {
    let f = fixture(vec![]);
    let watcher = Watcher::new(WatcherDefinitionBuilder::new("Stock").build());

    let entry = watcher.entry(&f.registry).await;
    assert_eq!(entry.app, "Stock");
    assert_eq!(entry.entry_id, 0);
    assert_eq!(entry.prev_fire_time, None);
    assert_eq!(entry.next_fire_time, None);
}

#[tokio::test]
async fn test_start_all_and_stop_all() -> Result<()> {
    let f = fixture(vec![]);
    let watchers = vec![
        Arc::new(Watcher::new(WatcherDefinitionBuilder::new("a").enabled().build())),
        Arc::new(Watcher::new(WatcherDefinitionBuilder::new("b").build())),
        Arc::new(Watcher::new(
            WatcherDefinitionBuilder::new("c").with_cron("bad").enabled().build(),
        )),
        Arc::new(Watcher::new(WatcherDefinitionBuilder::new("d").enabled().build())),
    ];

    assert_eq!(f.registry.status().await, SchedulerStatus::Stopped);
    assert!(f.registry.start_all(&watchers, &f.context).await);
    assert_eq!(f.registry.status().await, SchedulerStatus::Running);
    assert!(f.engine.is_running());
    assert_eq!(f.engine.len(), 2);
    assert!(watchers[0].entry_id().await.is_some());
    assert!(watchers[1].entry_id().await.is_none());
    assert!(watchers[2].entry_id().await.is_none());
    assert!(watchers[3].entry_id().await.is_some());

    assert!(!f.registry.start_all(&watchers, &f.context).await);
    assert_eq!(f.engine.start_calls(), 1);

    assert!(f.registry.stop_all(&watchers).await);
    assert_eq!(f.registry.status().await, SchedulerStatus::Stopped);
    assert!(f.engine.is_empty());
    assert!(!f.engine.is_running());
    for watcher in &watchers {
        assert!(watcher.entry_id().await.is_none());
    }

    assert!(!f.registry.stop_all(&watchers).await);
    assert_eq!(f.engine.stop_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let registry = SchedulerRegistry::with_cron_engine();
    assert!(matches!(
        registry.engine().await,
        Err(WatcherError::SchedulerUnavailable)
    ));

    let first = registry.init().await;
    let second = registry.init().await;
    assert!(Arc::ptr_eq(&first, &second));
}

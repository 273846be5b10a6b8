use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use watcher_core::{EntryId, EntrySnapshot, Job, TriggerEngine, WatcherResult};

use crate::cron_utils::CronScheduler;

#[derive(Debug, Default, Clone, Copy)]
struct FireTimes {
    prev: Option<DateTime<Local>>,
    next: Option<DateTime<Local>>,
}

struct RunningLoop {
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

struct Entry {
    schedule: CronScheduler,
    job: Job,
    times: Arc<Mutex<FireTimes>>,
    running: Option<RunningLoop>,
}

/// 基于tokio的cron触发引擎
///
/// 每个注册对应一个独立的tokio任务：睡眠到下次触发时间，执行回调直到完成，再计算下一次。
/// 同一注册的回调因此天然串行；不同注册之间没有顺序保证。
pub struct CronTriggerEngine {
    next_id: AtomicU64,
    running: AtomicBool,
    entries: Mutex<HashMap<EntryId, Entry>>,
    /// 已注销但可能仍在执行回调的循环，停止时一并等待
    detached: Mutex<Vec<JoinHandle<()>>>,
}

impl CronTriggerEngine {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            running: AtomicBool::new(false),
            entries: Mutex::new(HashMap::new()),
            detached: Mutex::new(Vec::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// 当前注册数量
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<EntryId, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_detached(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.detached.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn spawn_loop(id: EntryId, entry: &mut Entry) {
        if entry.running.is_some() {
            return;
        }
        let (cancel, receiver) = watch::channel(false);
        let handle = tokio::spawn(run_entry(
            id,
            entry.schedule.clone(),
            entry.job.clone(),
            entry.times.clone(),
            receiver,
        ));
        entry.running = Some(RunningLoop { cancel, handle });
    }
}

impl Default for CronTriggerEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_times(times: &Mutex<FireTimes>) -> MutexGuard<'_, FireTimes> {
    times.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn run_entry(
    id: EntryId,
    schedule: CronScheduler,
    job: Job,
    times: Arc<Mutex<FireTimes>>,
    mut cancel: watch::Receiver<bool>,
) {
    debug!("触发循环启动: entry={}", id);
    while !*cancel.borrow() {
        let now = Local::now();
        let Some(next) = schedule.next_execution_time(now) else {
            warn!("注册 {} 没有后续触发时间", id);
            break;
        };
        lock_times(&times).next = Some(next);

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = cancel.changed() => break,
        }
        if *cancel.borrow() {
            break;
        }

        lock_times(&times).prev = Some(next);
        // 回调执行期间不响应取消，停止时等待其自然结束
        job().await;
    }
    lock_times(&times).next = None;
    debug!("触发循环退出: entry={}", id);
}

#[async_trait]
impl TriggerEngine for CronTriggerEngine {
    fn register(&self, cron_expr: &str, job: Job) -> WatcherResult<EntryId> {
        let schedule = CronScheduler::new(cron_expr)?;
        let id = EntryId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut entry = Entry {
            schedule,
            job,
            times: Arc::new(Mutex::new(FireTimes::default())),
            running: None,
        };

        let mut entries = self.lock_entries();
        if self.is_running() {
            Self::spawn_loop(id, &mut entry);
        }
        entries.insert(id, entry);
        debug!("注册触发: entry={}, cron={}", id, cron_expr);
        Ok(id)
    }

    fn deregister(&self, id: EntryId) {
        let removed = self.lock_entries().remove(&id);
        if let Some(RunningLoop { cancel, handle }) = removed.and_then(|entry| entry.running) {
            let _ = cancel.send(true);
            let mut detached = self.lock_detached();
            detached.retain(|handle| !handle.is_finished());
            detached.push(handle);
            debug!("注销触发: entry={}", id);
        }
    }

    fn entry(&self, id: EntryId) -> Option<EntrySnapshot> {
        let entries = self.lock_entries();
        let entry = entries.get(&id)?;
        let times = *lock_times(&entry.times);
        Some(EntrySnapshot {
            id,
            prev: times.prev,
            next: times.next,
        })
    }

    fn start(&self) {
        let mut entries = self.lock_entries();
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        for (id, entry) in entries.iter_mut() {
            Self::spawn_loop(*id, entry);
        }
        info!("触发引擎已启动，注册数量: {}", entries.len());
    }

    async fn stop(&self) {
        let mut handles: Vec<JoinHandle<()>> = {
            let mut entries = self.lock_entries();
            self.running.store(false, Ordering::SeqCst);
            entries
                .values_mut()
                .filter_map(|entry| entry.running.take())
                .map(|RunningLoop { cancel, handle }| {
                    let _ = cancel.send(true);
                    handle
                })
                .collect()
        };
        handles.append(&mut self.lock_detached());

        let count = handles.len();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("触发循环异常退出: {}", e);
            }
        }
        info!("触发引擎已停止，等待结束的循环: {}", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counting_job(counter: Arc<AtomicUsize>) -> Job {
        Arc::new(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn test_register_assigns_positive_ids() {
        let engine = CronTriggerEngine::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let first = engine.register("0 0 *", counting_job(counter.clone())).unwrap();
        let second = engine.register("0 0 *", counting_job(counter)).unwrap();
        assert_eq!(first, EntryId(1));
        assert_eq!(second, EntryId(2));
        assert_eq!(engine.len(), 2);

        let snapshot = engine.entry(first).unwrap();
        assert_eq!(snapshot.prev, None);
        assert_eq!(snapshot.next, None);
    }

    #[tokio::test]
    async fn test_register_invalid_cron() {
        let engine = CronTriggerEngine::new();
        let result = engine.register("not a cron", counting_job(Arc::new(AtomicUsize::new(0))));
        assert!(result.is_err());
        assert!(engine.is_empty());
    }

    #[tokio::test]
    async fn test_deregister_unknown_is_ignored() {
        let engine = CronTriggerEngine::new();
        engine.deregister(EntryId(42));
        assert!(engine.entry(EntryId(42)).is_none());
    }

    #[tokio::test]
    async fn test_fires_every_second_and_stops() {
        let engine = CronTriggerEngine::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let id = engine.register("* * *", counting_job(counter.clone())).unwrap();

        engine.start();
        assert!(engine.is_running());
        tokio::time::sleep(Duration::from_millis(2300)).await;

        let snapshot = engine.entry(id).unwrap();
        assert!(snapshot.prev.is_some());
        assert!(snapshot.next.is_some());
        assert!(snapshot.next >= snapshot.prev);

        engine.stop().await;
        let fired = counter.load(Ordering::SeqCst);
        assert!(fired >= 1);

        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(counter.load(Ordering::SeqCst), fired);
        assert_eq!(engine.entry(id).unwrap().next, None);
    }

    #[tokio::test]
    async fn test_stop_waits_for_in_flight_job() {
        let engine = CronTriggerEngine::new();
        let finished = Arc::new(AtomicBool::new(false));
        let started = Arc::new(AtomicBool::new(false));
        let job: Job = {
            let finished = finished.clone();
            let started = started.clone();
            Arc::new(move || {
                let finished = finished.clone();
                let started = started.clone();
                async move {
                    started.store(true, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    finished.store(true, Ordering::SeqCst);
                }
                .boxed()
            })
        };
        engine.register("* * *", job).unwrap();
        engine.start();

        while !started.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        engine.stop().await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_stop_waits_for_job_of_deregistered_entry() {
        let engine = CronTriggerEngine::new();
        let finished = Arc::new(AtomicBool::new(false));
        let started = Arc::new(AtomicBool::new(false));
        let job: Job = {
            let finished = finished.clone();
            let started = started.clone();
            Arc::new(move || {
                let finished = finished.clone();
                let started = started.clone();
                async move {
                    started.store(true, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    finished.store(true, Ordering::SeqCst);
                }
                .boxed()
            })
        };
        let id = engine.register("* * *", job).unwrap();
        engine.start();

        while !started.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        engine.deregister(id);
        assert!(engine.entry(id).is_none());
        assert!(!finished.load(Ordering::SeqCst));

        engine.stop().await;
        assert!(finished.load(Ordering::SeqCst));
    }
}

//! 轮询调度器
//!
//! 每个数据点一个独立的定时任务，按各自的间隔调用 [`PollExecutor`]。
//!
//! - 任务内联执行轮询，上一次未结束时跳过错过的周期（`MissedTickBehavior::Skip`）
//! - 停止通过 watch 信号通知，在途轮询允许完成并写入结果
//! - 读计数按一次运行（start 到 stop）归属，stop 后旧任务的计数不会泄漏到下一次运行

use crate::error::PollingError;
use crate::executor::PollExecutor;
use domain::DataPointDefinition;
use plc_protocol::TransportGate;
use plc_storage::RegistryStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// 调度器运行指标；停止状态下全部为零。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollingMetrics {
    pub read_count: u64,
    pub elapsed_seconds: u64,
    pub reads_per_second: u64,
    pub active_timers: usize,
    pub running: bool,
}

/// 一次运行期间的统计。
struct RunStats {
    started_at: Instant,
    reads: AtomicU64,
}

struct PollTimer {
    interval_ms: u64,
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PollTimer {
    fn cancel(&self) {
        // 任务已退出时接收端不存在，忽略
        let _ = self.cancel.send(true);
    }
}

#[derive(Default)]
struct SchedulerState {
    run: Option<Arc<RunStats>>,
    timers: HashMap<String, PollTimer>,
}

pub struct PollingScheduler {
    executor: Arc<PollExecutor>,
    gate: Arc<TransportGate>,
    registry: Arc<dyn RegistryStore>,
    state: Mutex<SchedulerState>,
}

impl PollingScheduler {
    pub fn new(
        executor: Arc<PollExecutor>,
        gate: Arc<TransportGate>,
        registry: Arc<dyn RegistryStore>,
    ) -> Self {
        Self {
            executor,
            gate,
            registry,
            state: Mutex::new(SchedulerState::default()),
        }
    }

    /// 启动轮询；已在运行时不做任何事并返回 `false`。
    ///
    /// 连接失败只记录日志，调度照常启动，后续每次轮询由闸门重试连接。
    /// 连接与加载注册表期间不持有状态锁，`metrics`/`is_running` 不会被阻塞。
    pub async fn start(&self) -> Result<bool, PollingError> {
        if self.is_running().await {
            return Ok(false);
        }
        if let Err(err) = self.gate.connect().await {
            warn!(target: "plc.scheduler", error = %err, "connect_failed_on_start");
        }
        let definitions = self.registry.find_all().await?;

        let mut state = self.state.lock().await;
        if state.run.is_some() {
            return Ok(false);
        }
        let run = Arc::new(RunStats {
            started_at: Instant::now(),
            reads: AtomicU64::new(0),
        });
        for definition in definitions {
            let timer = self.spawn_timer(definition.clone(), run.clone());
            state.timers.insert(definition.key, timer);
        }
        info!(target: "plc.scheduler", timers = state.timers.len(), "polling_started");
        state.run = Some(run);
        Ok(true)
    }

    /// 停止轮询；已停止时返回 `false`。
    pub async fn stop(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.run.take().is_none() {
            return false;
        }
        let cancelled = state.timers.len();
        for (_, timer) in state.timers.drain() {
            timer.cancel();
        }
        info!(target: "plc.scheduler", timers = cancelled, "polling_stopped");
        true
    }

    pub async fn is_running(&self) -> bool {
        self.state.lock().await.run.is_some()
    }

    /// 运行中为新数据点启动定时任务；停止状态下等待下一次 start。
    pub async fn activate(&self, definition: &DataPointDefinition) -> bool {
        let mut state = self.state.lock().await;
        let Some(run) = state.run.clone() else {
            return false;
        };
        if state.timers.contains_key(&definition.key) {
            return false;
        }
        let timer = self.spawn_timer(definition.clone(), run);
        state.timers.insert(definition.key.clone(), timer);
        info!(
            target: "plc.scheduler",
            key = %definition.key,
            interval_ms = definition.poll_interval_ms,
            "timer_activated"
        );
        true
    }

    /// 撤销某个 key 的定时任务（无论调度器状态），并等待在途轮询结束。
    pub async fn retire(&self, key: &str) -> bool {
        let timer = self.state.lock().await.timers.remove(key);
        let Some(timer) = timer else {
            return false;
        };
        timer.cancel();
        if let Err(err) = timer.handle.await {
            warn!(target: "plc.scheduler", key, error = %err, "timer_join_failed");
        }
        info!(target: "plc.scheduler", key, "timer_retired");
        true
    }

    /// 间隔变化时以新节奏替换定时任务。
    pub async fn reschedule(&self, definition: &DataPointDefinition) -> bool {
        let mut state = self.state.lock().await;
        let Some(run) = state.run.clone() else {
            return false;
        };
        match state.timers.get(&definition.key) {
            Some(timer) if timer.interval_ms == definition.poll_interval_ms => return false,
            Some(timer) => timer.cancel(),
            None => return false,
        }
        let timer = self.spawn_timer(definition.clone(), run);
        state.timers.insert(definition.key.clone(), timer);
        info!(
            target: "plc.scheduler",
            key = %definition.key,
            interval_ms = definition.poll_interval_ms,
            "timer_rescheduled"
        );
        true
    }

    pub async fn metrics(&self) -> PollingMetrics {
        let state = self.state.lock().await;
        let Some(run) = &state.run else {
            return PollingMetrics::default();
        };
        let read_count = run.reads.load(Ordering::Relaxed);
        let elapsed = run.started_at.elapsed();
        PollingMetrics {
            read_count,
            elapsed_seconds: elapsed.as_secs(),
            reads_per_second: reads_per_second(read_count, elapsed),
            active_timers: state.timers.len(),
            running: true,
        }
    }

    fn spawn_timer(&self, definition: DataPointDefinition, run: Arc<RunStats>) -> PollTimer {
        let (cancel, mut cancelled) = watch::channel(false);
        let executor = self.executor.clone();
        let interval_ms = definition.poll_interval_ms;
        let period = Duration::from_millis(interval_ms);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.changed() => break,
                    _ = ticker.tick() => {
                        run.reads.fetch_add(1, Ordering::Relaxed);
                        let started = Instant::now();
                        executor.poll(&definition).await;
                        let skipped = skipped_ticks(started.elapsed(), period);
                        if skipped > 0 {
                            plc_telemetry::record_poll_overrun(skipped);
                            debug!(
                                target: "plc.scheduler",
                                key = %definition.key,
                                skipped,
                                "poll_overrun"
                            );
                        }
                    }
                }
            }
            debug!(target: "plc.scheduler", key = %definition.key, "timer_exited");
        });

        PollTimer {
            interval_ms,
            cancel,
            handle,
        }
    }
}

/// 运行满 1 秒后按实际经过时间（含小数部分）计算并向下取整，之前为 0。
fn reads_per_second(read_count: u64, elapsed: Duration) -> u64 {
    if elapsed < Duration::from_secs(1) {
        return 0;
    }
    (read_count as f64 / elapsed.as_secs_f64()).floor() as u64
}

/// 一次轮询耗时内错过的周期数；其中第一个会在轮询结束后立即补触发。
fn skipped_ticks(poll_elapsed: Duration, period: Duration) -> u64 {
    let period_ms = period.as_millis().max(1);
    (poll_elapsed.as_millis() / period_ms).saturating_sub(1) as u64
}

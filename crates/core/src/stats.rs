use serde::Serialize;

/// 监控运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// 运行次数
    pub run_count: i64,
    /// 运行平均耗时(ms)
    pub duration_avg: i64,
    /// 上次运行耗时(ms)
    pub prev_duration: i64,
}

impl RunStatistics {
    /// 记录一次运行耗时，平均值按整数截断增量计算
    pub fn record(&mut self, duration_ms: i64) {
        self.duration_avg =
            (self.duration_avg * self.run_count + duration_ms) / (self.run_count + 1);
        self.run_count += 1;
        self.prev_duration = duration_ms;
    }
}

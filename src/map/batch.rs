//! 批量映射：每个片段一个任务，提交到固定大小的 rayon 线程池。
//!
//! 每个任务都有自己的截止时间和故障边界：超时记为 timeout，
//! 其他错误（包括链退化和 panic）记为 exception，都不会影响其他片段。

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;

use super::{MappingRecord, Mapper};
use crate::error::MapError;
use crate::seq::Sequence;
use crate::util::logging::indent;

/// 单任务墙钟截止时间，在流水线各阶段之间检查
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub fn new(limit: Option<Duration>) -> Self {
        Self { start: Instant::now(), limit }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn expired(&self) -> bool {
        self.limit.map_or(false, |l| self.elapsed() > l)
    }

    pub fn check(&self) -> Result<(), MapError> {
        match self.limit {
            Some(limit) => {
                let elapsed = self.elapsed();
                if elapsed > limit {
                    Err(MapError::Timeout { elapsed, limit })
                } else {
                    Ok(())
                }
            }
            None => Ok(()),
        }
    }
}

/// 成功映射的记录在完成时交给 sink；实现需要自行保证并发写入的串行化
pub trait MappingSink: Sync {
    fn accept(&self, record: &MappingRecord) -> std::io::Result<()>;
}

impl<F> MappingSink for F
where
    F: Fn(&MappingRecord) -> std::io::Result<()> + Sync,
{
    fn accept(&self, record: &MappingRecord) -> std::io::Result<()> {
        self(record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Mapped(Box<MappingRecord>),
    Timeout { elapsed: Duration },
    /// 除超时以外的所有失败，附带原因
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentOutcome {
    /// 输入中的序号
    pub index: usize,
    pub name: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// 按完成顺序收集；需要输入顺序时按 `index` 排序
    pub outcomes: Vec<FragmentOutcome>,
    pub successes: usize,
    pub timeouts: usize,
    pub exceptions: usize,
}

impl BatchReport {
    fn from_outcomes(outcomes: Vec<FragmentOutcome>) -> Self {
        let (mut successes, mut timeouts, mut exceptions) = (0, 0, 0);
        for o in &outcomes {
            match o.outcome {
                Outcome::Mapped(_) => successes += 1,
                Outcome::Timeout { .. } => timeouts += 1,
                Outcome::Failed(_) => exceptions += 1,
            }
        }
        Self { outcomes, successes, timeouts, exceptions }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn percent(&self, count: usize) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total() as f64
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &MappingRecord> + '_ {
        self.outcomes.iter().filter_map(|o| match &o.outcome {
            Outcome::Mapped(rec) => Some(rec.as_ref()),
            _ => None,
        })
    }

    pub fn sort_by_input(&mut self) {
        self.outcomes.sort_by_key(|o| o.index);
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fragments:  {}", self.total())?;
        writeln!(f, "successes:  {} ({:.2}%)", self.successes, self.percent(self.successes))?;
        writeln!(f, "timeouts:   {} ({:.2}%)", self.timeouts, self.percent(self.timeouts))?;
        write!(f, "exceptions: {} ({:.2}%)", self.exceptions, self.percent(self.exceptions))
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl Mapper {
    /// 用默认流水线映射全部片段
    pub fn map_all(&self, fragments: &[Sequence], sink: &dyn MappingSink) -> Result<BatchReport> {
        self.run_batch(fragments, sink, |mapper, i, frag, deadline| mapper.map_fragment(i, frag, deadline))
    }

    /// 以 `job` 作为单片段流水线运行批处理。
    ///
    /// 只有线程池创建失败会返回错误；单个片段的任何失败都只记录在报告里。
    pub fn run_batch<F>(&self, fragments: &[Sequence], sink: &dyn MappingSink, job: F) -> Result<BatchReport>
    where
        F: Fn(&Mapper, usize, &Sequence, &Deadline) -> Result<MappingRecord, MapError> + Sync,
    {
        let threads = self.opt.threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .with_context(|| format!("cannot build a worker pool of {} threads", threads))?;

        let total = fragments.len();
        info!("Mapping {} fragments with {} worker(s)", total, threads);

        let outcomes: Vec<FragmentOutcome> = pool.install(|| {
            fragments
                .par_iter()
                .enumerate()
                .map(|(i, frag)| {
                    debug!("Fragment {} of {}...", i + 1, total);
                    let deadline = Deadline::new(self.opt.timeout);
                    let result = panic::catch_unwind(AssertUnwindSafe(|| -> Result<MappingRecord, MapError> {
                        let rec = job(self, i, frag, &deadline)?;
                        deadline.check()?;
                        sink.accept(&rec)?;
                        Ok(rec)
                    }))
                    .unwrap_or_else(|payload| Err(MapError::Panicked(panic_message(payload))));

                    let outcome = match result {
                        Ok(rec) => {
                            debug!("{}Done!", indent(1));
                            Outcome::Mapped(Box::new(rec))
                        }
                        Err(MapError::Timeout { elapsed, .. }) => {
                            warn!("Fragment {} ('{}') timed out after {:?}", i + 1, frag.name, elapsed);
                            Outcome::Timeout { elapsed }
                        }
                        Err(e) => {
                            warn!("Fragment {} ('{}') generated an exception: {}", i + 1, frag.name, e);
                            Outcome::Failed(e.to_string())
                        }
                    };
                    FragmentOutcome { index: i, name: frag.name.clone(), outcome }
                })
                .collect()
        });

        let report = BatchReport::from_outcomes(outcomes);
        info!(
            "Mapped {}/{} fragments ({} timeouts, {} exceptions)",
            report.successes,
            report.total(),
            report.timeouts,
            report.exceptions
        );
        Ok(report)
    }
}

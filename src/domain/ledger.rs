// ==========================================
// 车间在制品流转追踪系统 - 工序台账
// ==========================================
// 职责: 每实体每工序的 {produced, available} 计数对
// 红线: 所有扣减在 0 处截断, 台账永不出现负缓冲;
//       任何操作不因"减到负数"而失败
// ==========================================

use crate::domain::types::ProcessStep;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// StepStat - 单工序计数对
// ==========================================
// produced: 该工序累计良品产出 (仅入库验证会显式扣减)
// available: 该工序当前可投入量 (输入缓冲, 可升可降)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStat {
    pub produced: i64,
    pub available: i64,
}

// ==========================================
// Ledger - 工序台账 (step → StepStat)
// ==========================================
// BTreeMap 保证 JSON 序列化的键序稳定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger(pub BTreeMap<ProcessStep, StepStat>);

impl Ledger {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// 读取某工序计数对 (缺省为 0/0)
    pub fn stat(&self, step: ProcessStep) -> StepStat {
        self.0.get(&step).copied().unwrap_or_default()
    }

    /// 某工序累计良品产出
    pub fn produced(&self, step: ProcessStep) -> i64 {
        self.stat(step).produced
    }

    /// 某工序当前可投入量
    pub fn available(&self, step: ProcessStep) -> i64 {
        self.stat(step).available
    }

    /// 可变访问 (缺省插入 0/0)
    pub fn stat_mut(&mut self, step: ProcessStep) -> &mut StepStat {
        self.0.entry(step).or_default()
    }

    /// 报产记账: produced += good; available = max(0, available - (good + defect))
    ///
    /// 不良品在此处离开系统: 只消耗本工序缓冲, 不向任何下游传播。
    pub fn record_output(&mut self, step: ProcessStep, good: i64, defect: i64) {
        let stat = self.stat_mut(step);
        stat.produced += good;
        stat.available = (stat.available - (good + defect)).max(0);
    }

    /// 向某工序注入可投入量 (前道良品流入 / 汇流边供料)
    pub fn add_available(&mut self, step: ProcessStep, qty: i64) {
        let stat = self.stat_mut(step);
        stat.available += qty;
    }

    /// 扣减某工序累计产出, 在 0 处截断 (仅入库验证使用)
    pub fn reduce_produced(&mut self, step: ProcessStep, qty: i64) {
        let stat = self.stat_mut(step);
        stat.produced = (stat.produced - qty).max(0);
    }

    /// 序列化为 JSON 字符串 (数据库列)
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// 从 JSON 字符串还原 (空串/缺省视为空台账)
    pub fn from_json(s: &str) -> Self {
        if s.trim().is_empty() {
            return Self::new();
        }
        serde_json::from_str(s).unwrap_or_default()
    }
}
